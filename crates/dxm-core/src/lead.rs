//! # Lead Capture
//!
//! Two independent forms collect a fixed, ordered list of text fields: a
//! quote request from a clinic and a registration request from a vendor.
//! A complete form becomes an [`Envelope`] that is posted to the lead
//! webhook unchanged:
//!
//! ```json
//! { "type": "quote", "payload": { "name": "...", ... }, "meta": { "page": "...", "userAgent": "..." } }
//! ```
//!
//! Only presence is validated. Leads are forwarded to a human reviewer and
//! never written back into the record store.

use std::fmt;
use std::str::FromStr;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{CoreError, LeadError};

/// Which form a lead came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadKind {
    Quote,
    VendorRegister,
}

/// One text input of a lead form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    /// Payload key.
    pub name: &'static str,
    pub label: &'static str,
    pub placeholder: &'static str,
}

const fn field(name: &'static str, label: &'static str, placeholder: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        label,
        placeholder,
    }
}

/// Quote request fields, in display and payload order.
pub const QUOTE_FIELDS: &[FieldSpec] = &[
    field("name", "이름", "홍길동"),
    field("phone", "연락받을 전화번호", "010-0000-0000"),
    field("department", "진료과", "예: 치과, 안과, 피부과"),
    field("location", "현장위치", "예: 서울시 강남구"),
    field("startDate", "착공 가능일자", "예: 2026년 4월"),
    field("openDate", "희망 오픈일자", "예: 2026년 8월"),
    field("contractStatus", "계약상태", "예: 임대차계약 완료"),
    field("buildingUse", "건물 용도변경", "예: 필요 / 불필요 / 모름"),
    field("blueprint", "건축도면 유무", "예: 있음 / 없음 / 모름"),
    field("rooms", "필요실", "예: 진료실 2, 대기실, 상담실"),
];

/// Vendor registration fields, in display and payload order.
pub const VENDOR_REGISTER_FIELDS: &[FieldSpec] = &[
    field("companyName", "업체명", "예: 메디플랜 디자인"),
    field("contactName", "담당자명", "홍길동"),
    field("phone", "연락처", "010-0000-0000"),
    field("email", "이메일", "example@company.com"),
    field("region", "활동지역", "예: 서울, 경기"),
    field("instagram", "인스타그램 링크", "https://instagram.com/..."),
    field("website", "홈페이지 링크", "https://..."),
    field("intro", "한줄소개", "병원 인테리어 전문 업체입니다"),
    field("notes", "비고", "추가 전달사항이 있으면 입력해주세요"),
];

/// Copy shown in the confirmation dialog after a lead is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Confirmation {
    pub title: &'static str,
    pub description: &'static str,
}

impl LeadKind {
    pub fn all() -> &'static [LeadKind] {
        &[Self::Quote, Self::VendorRegister]
    }

    /// Wire name, used as the envelope `type`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quote => "quote",
            Self::VendorRegister => "vendor_register",
        }
    }

    pub fn fields(&self) -> &'static [FieldSpec] {
        match self {
            Self::Quote => QUOTE_FIELDS,
            Self::VendorRegister => VENDOR_REGISTER_FIELDS,
        }
    }

    pub fn confirmation(&self) -> Confirmation {
        match self {
            Self::Quote => Confirmation {
                title: "의사가 만나는 의사 닥스밋",
                description: "닥스밋 담당자가 빠른시일 내 연락드리겠습니다. 더 빠른 안내는 070-7834-8371로 연락 부탁드립니다.",
            },
            Self::VendorRegister => Confirmation {
                title: "등록 요청 완료",
                description: "빠른시일 내 검토해 업로드 할게요.",
            },
        }
    }

    /// Message shown when delivery fails at the transport level.
    pub fn retry_message(&self) -> &'static str {
        match self {
            Self::Quote => "전송 중 오류가 발생했습니다. 다시 시도해주세요.",
            Self::VendorRegister => "업체 등록 전송 중 오류가 발생했습니다. 다시 시도해주세요.",
        }
    }
}

impl fmt::Display for LeadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeadKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "quote" => Ok(Self::Quote),
            "vendor_register" => Ok(Self::VendorRegister),
            other => Err(CoreError::UnknownLeadKind(other.to_string())),
        }
    }
}

/// Values of one lead form, held in field order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadForm {
    kind: LeadKind,
    values: Vec<String>,
}

impl LeadForm {
    /// An empty form.
    pub fn new(kind: LeadKind) -> Self {
        Self {
            kind,
            values: vec![String::new(); kind.fields().len()],
        }
    }

    /// Fill from `(name, value)` pairs. Names the form does not define are
    /// ignored.
    pub fn from_pairs<'a, I>(kind: LeadKind, pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut form = Self::new(kind);
        for (name, value) in pairs {
            let _ = form.set(name, value);
        }
        form
    }

    pub fn kind(&self) -> LeadKind {
        self.kind
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.kind.fields().iter().position(|f| f.name == name)
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) -> Result<(), LeadError> {
        let index = self.index_of(name).ok_or_else(|| LeadError::UnknownField {
            kind: self.kind,
            field: name.to_string(),
        })?;
        self.values[index] = value.into();
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.index_of(name).map(|i| self.values[i].as_str())
    }

    /// `(spec, value)` pairs in field order.
    pub fn entries(&self) -> impl Iterator<Item = (&'static FieldSpec, &str)> + '_ {
        self.kind
            .fields()
            .iter()
            .zip(self.values.iter().map(String::as_str))
    }

    /// Names of fields whose value is blank after trimming.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        self.entries()
            .filter(|(_, v)| v.trim().is_empty())
            .map(|(spec, _)| spec.name)
            .collect()
    }

    /// Submission is enabled only when every field has a value.
    pub fn is_complete(&self) -> bool {
        self.values.iter().all(|v| !v.trim().is_empty())
    }

    pub fn clear(&mut self) {
        self.values.iter_mut().for_each(String::clear);
    }

    /// Snapshot of the values as an ordered payload.
    pub fn payload(&self) -> LeadPayload {
        LeadPayload {
            entries: self
                .entries()
                .map(|(spec, v)| (spec.name, v.to_string()))
                .collect(),
        }
    }
}

/// Field map sent as `payload`; serializes as a JSON object in field order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadPayload {
    entries: Vec<(&'static str, String)>,
}

impl LeadPayload {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.entries.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

impl Serialize for LeadPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Where the lead was submitted from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionMeta {
    #[serde(default)]
    pub page: String,
    #[serde(default, rename = "userAgent")]
    pub user_agent: String,
}

/// Fixed-shape wrapper posted to the lead webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: LeadKind,
    pub payload: LeadPayload,
    pub meta: SubmissionMeta,
}

impl Envelope {
    pub fn new(form: &LeadForm, meta: SubmissionMeta) -> Self {
        Self {
            kind: form.kind(),
            payload: form.payload(),
            meta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(kind: LeadKind) -> LeadForm {
        LeadForm::from_pairs(kind, kind.fields().iter().map(|f| (f.name, "값")))
    }

    #[test]
    fn field_lists_have_expected_order() {
        let quote: Vec<_> = QUOTE_FIELDS.iter().map(|f| f.name).collect();
        assert_eq!(
            quote,
            vec![
                "name",
                "phone",
                "department",
                "location",
                "startDate",
                "openDate",
                "contractStatus",
                "buildingUse",
                "blueprint",
                "rooms"
            ]
        );
        assert_eq!(VENDOR_REGISTER_FIELDS.len(), 9);
        assert_eq!(VENDOR_REGISTER_FIELDS[0].name, "companyName");
        assert_eq!(VENDOR_REGISTER_FIELDS[8].name, "notes");
    }

    #[test]
    fn kind_wire_names() {
        for kind in LeadKind::all() {
            assert_eq!(kind.as_str().parse::<LeadKind>().unwrap(), *kind);
            assert_eq!(
                serde_json::to_string(kind).unwrap(),
                format!("\"{}\"", kind.as_str())
            );
        }
        assert!("register".parse::<LeadKind>().is_err());
    }

    #[test]
    fn new_form_is_incomplete_with_every_field_missing() {
        let form = LeadForm::new(LeadKind::Quote);
        assert!(!form.is_complete());
        assert_eq!(form.missing_fields().len(), QUOTE_FIELDS.len());
    }

    #[test]
    fn whitespace_counts_as_missing() {
        let mut form = filled(LeadKind::VendorRegister);
        form.set("email", "   ").unwrap();
        assert_eq!(form.missing_fields(), vec!["email"]);
        assert!(!form.is_complete());
    }

    #[test]
    fn unknown_field_rejected_on_set_ignored_on_bulk() {
        let mut form = LeadForm::new(LeadKind::Quote);
        assert!(matches!(
            form.set("companyName", "x"),
            Err(LeadError::UnknownField { .. })
        ));
        let form = LeadForm::from_pairs(LeadKind::Quote, [("companyName", "x"), ("name", "홍길동")]);
        assert_eq!(form.get("name"), Some("홍길동"));
        assert_eq!(form.get("companyName"), None);
    }

    #[test]
    fn clear_empties_all_values() {
        let mut form = filled(LeadKind::Quote);
        form.clear();
        assert_eq!(form, LeadForm::new(LeadKind::Quote));
    }

    #[test]
    fn envelope_shape() {
        let form = filled(LeadKind::VendorRegister);
        let env = Envelope::new(
            &form,
            SubmissionMeta {
                page: "https://doxtalk.co.kr/register".into(),
                user_agent: "Mozilla/5.0".into(),
            },
        );
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json["type"], "vendor_register");
        assert_eq!(json["payload"]["companyName"], "값");
        assert_eq!(json["meta"]["page"], "https://doxtalk.co.kr/register");
        assert_eq!(json["meta"]["userAgent"], "Mozilla/5.0");
    }

    #[test]
    fn payload_serializes_in_field_order() {
        let form = filled(LeadKind::Quote);
        let text = serde_json::to_string(&form.payload()).unwrap();
        let name_at = text.find("\"name\"").unwrap();
        let rooms_at = text.find("\"rooms\"").unwrap();
        assert!(name_at < rooms_at);
    }
}
