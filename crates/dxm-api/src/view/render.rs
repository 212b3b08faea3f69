//! # HTML Rendering
//!
//! Server-rendered pages for the directory site. Every page shares the
//! same header and footer. All record and user text goes through
//! [`escape`] before it reaches the markup.

use dxm_core::{
    CompanyRecord, DirectoryPolicy, DirectorySelection, FilterState, FormStatus, LeadFormMachine,
    LeadKind, LinkAffordance, Region, SitemapEntry,
};

use super::submission::TOKEN_FIELD;

/// Brand name shown in the header and titles.
pub const BRAND: &str = "DOXMEET";
/// External terms of service.
pub const TERMS_URL: &str = "https://www.doxmeet.com/about/tos";

const SITE_TITLE: &str = "병원인테리어 업체모음";
const SITE_DESCRIPTION: &str = "의사가 만나는 의사 닥스밋 - 병원 인테리어 업체를 한눈에 비교하세요";
const MISSING_FIELDS_MESSAGE: &str = "필수 항목을 모두 입력해주세요.";
/// Shown while an earlier post of the same form is still being relayed.
const SUBMITTING_MESSAGE: &str = "이미 접수된 요청을 전송하고 있습니다. 잠시만 기다려주세요.";

/// Escape text for HTML element content and quoted attribute values.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Wrap `main` in the document shell with the shared header and footer.
pub fn layout(title: &str, description: &str, main: &str) -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="ko">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<meta name="theme-color" content="#2563eb">
<meta name="description" content="{description}">
<title>{title}</title>
<link rel="icon" href="/favicon.ico">
</head>
<body>
{header}
<main>
{main}
</main>
{footer}
</body>
</html>
"##,
        title = escape(title),
        description = escape(description),
        header = site_header(),
        footer = site_footer(),
    )
}

fn site_header() -> String {
    format!(
        r#"<header class="site-header">
<a class="brand" href="/"><span class="brand-name">{BRAND}</span> <span class="brand-sub">인테리어 디렉토리</span></a>
<nav class="site-nav">
<a href="/quote">견적 요청</a>
<a class="button-outline" href="/register">업체 등록하기</a>
</nav>
</header>"#
    )
}

fn site_footer() -> String {
    format!(
        r#"<footer class="site-footer">
<div class="footer-top">
<a href="/"><img src="/logos/doxmeet-logo.jpg" alt="{BRAND} 로고" width="128" height="32"></a>
<nav><a href="/terms">이용약관</a> <span>|</span> <a href="/sitemap-page">사이트맵</a></nav>
</div>
<div class="footer-info">
<p><strong>닥스밋({BRAND})</strong> | 대표 : 홍길동 | 사업자등록번호 : 000-00-00000</p>
<p>주소 : 서울특별시 강남구 테헤란로 123, 4층</p>
<p>Tel : 02-000-0000 | Fax : 02-000-0001 | Email : contact@doxmeet.kr</p>
</div>
<p class="copyright">Copyright &copy; 2026 {BRAND}. All Rights Reserved.</p>
</footer>"#
    )
}

// ---------------------------------------------------------------------------
// Directory
// ---------------------------------------------------------------------------

/// Link to the directory with `state`'s filters at `page`.
///
/// Default values are left out, so the unfiltered first page is `/`.
pub fn filter_href(state: &FilterState, page: u32) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    if state.exclude_region() {
        query.append_pair("exclude_region", "on");
    }
    for region in state.selected_regions() {
        query.append_pair("region", region.as_str());
    }
    if !state.search_query().is_empty() {
        query.append_pair("q", state.search_query());
    }
    if page > 1 {
        query.append_pair("page", &page.to_string());
    }
    let query = query.finish();
    if query.is_empty() {
        "/".to_string()
    } else {
        format!("/?{query}")
    }
}

/// The directory page. `selection` is `None` while records are loading.
pub fn directory_page(
    state: &FilterState,
    selection: Option<&DirectorySelection<'_>>,
    policy: &DirectoryPolicy,
) -> String {
    let mut main = String::new();
    main.push_str(&filter_bar(state, policy.excluded_region));

    let count = selection.map(|s| s.filtered_count).unwrap_or(0);
    main.push_str(&format!(
        r#"<p class="result-count">총 <strong>{count}</strong>개 업체</p>"#
    ));

    main.push_str(r#"<div class="company-grid">"#);
    main.push_str(
        r#"<a class="quote-cta" href="/quote"><p class="cta-title">닥스밋 무료 개원 상담 신청</p><p class="cta-body">기본정보를 입력해주시면 닥스밋 담당이 연락드립니다.</p></a>"#,
    );
    match selection {
        None => main.push_str(
            r#"<div class="placeholder"><p>업체 목록 불러오는 중...</p><p>잠시만 기다려주세요</p></div>"#,
        ),
        Some(s) if s.is_empty() => main.push_str(
            r#"<div class="placeholder empty"><p>검색 결과가 없습니다</p><p>다른 검색어를 사용해 보세요</p></div>"#,
        ),
        Some(s) => {
            for record in &s.items {
                main.push_str(&company_card(record));
            }
        }
    }
    main.push_str("</div>");

    if let Some(s) = selection {
        main.push_str(&pagination(state, s));
    }

    layout(SITE_TITLE, SITE_DESCRIPTION, &main)
}

fn filter_bar(state: &FilterState, home_region: Region) -> String {
    let mut regions = String::new();
    for region in Region::all() {
        let checked = if state.selected_regions().contains(region) {
            " checked"
        } else {
            ""
        };
        regions.push_str(&format!(
            r#"<label><input type="checkbox" name="region" value="{r}"{checked}> {r}</label>"#,
            r = region.as_str(),
        ));
    }
    let exclude_checked = if state.exclude_region() { " checked" } else { "" };
    format!(
        r#"<form class="filter-bar" method="get" action="/">
<input type="text" name="q" value="{q}" placeholder="업체명 검색..." aria-label="업체명 검색">
<label class="exclude"><input type="checkbox" name="exclude_region" value="on"{exclude_checked}> {home} 제외 보기</label>
<fieldset class="region-panel"><legend>지역</legend>{regions}</fieldset>
<button type="submit">검색</button>
</form>"#,
        q = escape(state.search_query()),
        home = home_region.as_str(),
    )
}

/// One company card.
pub fn company_card(record: &CompanyRecord) -> String {
    let name = escape(&record.name);
    let logo = match &record.logo {
        Some(src) => format!(
            r#"<img class="logo" src="{}" alt="{name} 로고" width="56" height="56">"#,
            escape(src)
        ),
        None => format!(
            r#"<span class="logo initial" aria-hidden="true">{}</span>"#,
            escape(&record.initial())
        ),
    };
    let description = record
        .description
        .as_deref()
        .map(|d| format!(r#"<p class="description">{}</p>"#, escape(d)))
        .unwrap_or_default();

    format!(
        r#"<article class="company-card" data-id="{id}">{logo}<div class="card-body"><h3>{name}</h3><p class="region">{region}</p></div><div class="links">{insta}{web}</div>{description}</article>"#,
        id = record.id,
        region = escape(&record.region.to_string()),
        insta = link_affordance(&record.instagram_link(), &name, "인스타그램"),
        web = link_affordance(&record.website_link(), &name, "홈페이지"),
    )
}

fn link_affordance(link: &LinkAffordance, escaped_name: &str, what: &str) -> String {
    match link {
        LinkAffordance::Enabled { href } => format!(
            r#"<a class="link" href="{}" target="_blank" rel="noopener noreferrer" aria-label="{escaped_name} {what}">{what}</a>"#,
            escape(href)
        ),
        LinkAffordance::Disabled => format!(
            r#"<span class="link disabled" aria-disabled="true" aria-label="{what} 링크 없음">{what}</span>"#
        ),
    }
}

fn pagination(state: &FilterState, selection: &DirectorySelection<'_>) -> String {
    let p = selection.pagination;
    if p.total_pages <= 1 {
        return String::new();
    }

    let mut nav = String::from(r#"<nav class="pagination">"#);
    if p.has_previous() {
        nav.push_str(&format!(
            r#"<a href="{}" aria-label="이전 페이지">&lsaquo;</a>"#,
            escape(&filter_href(state, p.page - 1))
        ));
    } else {
        nav.push_str(r#"<span class="disabled" aria-label="이전 페이지">&lsaquo;</span>"#);
    }
    for page in 1..=p.total_pages {
        if page == p.page {
            nav.push_str(&format!(r#"<span class="current" aria-current="page">{page}</span>"#));
        } else {
            nav.push_str(&format!(
                r#"<a href="{}">{page}</a>"#,
                escape(&filter_href(state, page))
            ));
        }
    }
    if p.has_next() {
        nav.push_str(&format!(
            r#"<a href="{}" aria-label="다음 페이지">&rsaquo;</a>"#,
            escape(&filter_href(state, p.page + 1))
        ));
    } else {
        nav.push_str(r#"<span class="disabled" aria-label="다음 페이지">&rsaquo;</span>"#);
    }
    nav.push_str("</nav>");
    nav
}

// ---------------------------------------------------------------------------
// Lead forms
// ---------------------------------------------------------------------------

struct FormCopy {
    path: &'static str,
    title: &'static str,
    description: &'static str,
    heading: &'static str,
    intro: &'static str,
    submit: &'static str,
}

fn form_copy(kind: LeadKind) -> FormCopy {
    match kind {
        LeadKind::Quote => FormCopy {
            path: "/quote",
            title: "견적 요청 - DOXMEET 인테리어 디렉토리",
            description: "닥스밋에 병원 인테리어 견적을 요청하세요",
            heading: "견적 요청",
            intro: "아래 정보를 입력하시면 닥스밋 담당자가 연락드립니다.",
            submit: "견적 요청하기",
        },
        LeadKind::VendorRegister => FormCopy {
            path: "/register",
            title: "업체 등록 - DOXMEET 인테리어 디렉토리",
            description: "DOXMEET 인테리어 디렉토리에 업체를 등록하세요",
            heading: "업체 등록",
            intro: "아래 정보를 입력하시면 검토 후 디렉토리에 등록됩니다.",
            submit: "등록 요청하기",
        },
    }
}

/// Page path of a lead form.
pub fn form_path(kind: LeadKind) -> &'static str {
    form_copy(kind).path
}

/// A lead form page in whatever state `machine` is in.
///
/// `missing` names fields the last submit attempt left blank. `token` is the
/// one-time submission token the next post must carry.
pub fn lead_form_page(machine: &LeadFormMachine, missing: &[&str], token: &str) -> String {
    let form = machine.form();
    let copy = form_copy(form.kind());

    let mut main = format!(
        r#"<a class="back" href="/">디렉토리로 돌아가기</a>
<section class="form-card">
<h1>{heading}</h1>
<p class="intro">{intro}</p>
"#,
        heading = copy.heading,
        intro = copy.intro,
    );

    if !missing.is_empty() {
        main.push_str(&format!(
            r#"<p class="form-error" role="alert">{MISSING_FIELDS_MESSAGE}</p>"#
        ));
    }
    if let FormStatus::Failed { message, retryable } = machine.status() {
        let class = if *retryable { "form-error retry" } else { "form-error config" };
        main.push_str(&format!(
            r#"<p class="{class}" role="alert">{}</p>"#,
            escape(message)
        ));
    }

    let submitting = machine.status() == &FormStatus::Submitting;
    if submitting {
        main.push_str(&format!(
            r#"<p class="form-status" role="status">{SUBMITTING_MESSAGE}</p>"#
        ));
    }

    main.push_str(&format!(
        r#"<form method="post" action="{path}" onsubmit="this.querySelector('button[type=submit]').disabled=true"><input type="hidden" name="{TOKEN_FIELD}" value="{token}">"#,
        path = copy.path,
        token = escape(token),
    ));
    for (field, value) in form.entries() {
        let invalid = if missing.contains(&field.name) {
            r#" aria-invalid="true""#
        } else {
            ""
        };
        main.push_str(&format!(
            r#"<div class="field"><label for="{n}">{label}</label><input id="{n}" name="{n}" type="text" placeholder="{ph}" value="{v}" required{invalid}></div>"#,
            n = field.name,
            label = escape(field.label),
            ph = escape(field.placeholder),
            v = escape(value),
        ));
    }
    main.push_str(&format!(
        r#"<button type="submit"{disabled}>{label}</button></form></section>"#,
        disabled = if submitting { " disabled" } else { "" },
        label = if submitting { "전송 중..." } else { copy.submit },
    ));

    if machine.status() == &FormStatus::Confirmed {
        let confirmation = form.kind().confirmation();
        main.push_str(&format!(
            r#"
<dialog class="confirmation" open><h2>{title}</h2><p>{description}</p><a class="button" href="{path}">확인</a></dialog>"#,
            title = confirmation.title,
            description = confirmation.description,
            path = copy.path,
        ));
    }

    layout(copy.title, copy.description, &main)
}

// ---------------------------------------------------------------------------
// Static pages
// ---------------------------------------------------------------------------

pub fn terms_page() -> String {
    let main = format!(
        r#"<section class="terms">
<h1>이용약관</h1>
<p>이용약관은 {BRAND} 공식 페이지에서 확인하실 수 있습니다.</p>
<a href="{TERMS_URL}" target="_blank" rel="noopener noreferrer">{BRAND} 이용약관 보러가기</a>
</section>"#
    );
    layout("이용약관 - DOXMEET 인테리어 디렉토리", SITE_DESCRIPTION, &main)
}

/// Human-readable sitemap.
pub fn sitemap_page() -> String {
    let mut main = String::from("<section class=\"sitemap\">\n<h1>사이트맵</h1>\n<ul>\n");
    for entry in SitemapEntry::all() {
        main.push_str(&format!(
            "<li><a href=\"{}\">{}</a></li>\n",
            entry.path, entry.title
        ));
    }
    main.push_str("<li><a href=\"/terms\">이용약관</a></li>\n</ul>\n</section>");
    layout("사이트맵 - DOXMEET 인테리어 디렉토리", SITE_DESCRIPTION, &main)
}

/// sitemaps.org XML for every static route under `base_url`.
pub fn sitemap_xml(base_url: &str) -> String {
    let lastmod = SitemapEntry::last_modified()
        .map(|d| format!("<lastmod>{d}</lastmod>"))
        .unwrap_or_default();
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for entry in SitemapEntry::all() {
        xml.push_str(&format!(
            "<url><loc>{}</loc>{lastmod}<changefreq>{}</changefreq><priority>{:.1}</priority></url>\n",
            escape(&entry.url(base_url)),
            entry.change_frequency.as_str(),
            entry.priority,
        ));
    }
    xml.push_str("</urlset>\n");
    xml
}
