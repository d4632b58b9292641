use super::PolicySearchRequest;
use super::region::RegionPicker;

/// First option of every tag row.
pub const NO_RESTRICTION: &str = "제한없음";

const EDUCATION: &[&str] = &[
    NO_RESTRICTION,
    "고졸 미만",
    "고교 재학",
    "고졸 예정",
    "고교 졸업",
    "대학 재학",
    "대졸 예정",
    "대학 졸업",
    "석·박사",
];

const MAJOR: &[&str] = &[
    NO_RESTRICTION,
    "인문계열",
    "사회계열",
    "상경계열",
    "이학계열",
    "공학계열",
    "예체능계열",
    "농산업계열",
];

const EMPLOYMENT_STATUS: &[&str] = &[
    NO_RESTRICTION,
    "재직자",
    "자영업자",
    "미취업자",
    "프리랜서",
    "일용근로자",
    "(예비)창업자",
    "단기근로자",
    "영농종사자",
];

const SPECIALIZATION: &[&str] = &[
    NO_RESTRICTION,
    "중소기업",
    "여성",
    "기초생활수급자",
    "한부모가정",
    "장애인",
    "농업인",
    "군인",
    "지역인재",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagRowKind {
    Education,
    Major,
    EmploymentStatus,
    Specialization,
}

impl TagRowKind {
    pub const ALL: [TagRowKind; 4] = [
        TagRowKind::Education,
        TagRowKind::Major,
        TagRowKind::EmploymentStatus,
        TagRowKind::Specialization,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TagRowKind::Education => "학력",
            TagRowKind::Major => "전공요건",
            TagRowKind::EmploymentStatus => "취업상태",
            TagRowKind::Specialization => "특화분야",
        }
    }

    pub fn options(self) -> &'static [&'static str] {
        match self {
            TagRowKind::Education => EDUCATION,
            TagRowKind::Major => MAJOR,
            TagRowKind::EmploymentStatus => EMPLOYMENT_STATUS,
            TagRowKind::Specialization => SPECIALIZATION,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Single-select row of tag buttons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRow {
    kind: TagRowKind,
    selected: usize,
}

impl TagRow {
    pub fn new(kind: TagRowKind) -> Self {
        Self { kind, selected: 0 }
    }

    pub fn kind(&self) -> TagRowKind {
        self.kind
    }

    pub fn options(&self) -> &'static [&'static str] {
        self.kind.options()
    }

    pub fn selected(&self) -> &'static str {
        self.options()[self.selected]
    }

    /// Selects `option`, deselecting the rest of the row. Unknown options
    /// are rejected.
    pub fn select(&mut self, option: &str) -> bool {
        match self.options().iter().position(|o| *o == option) {
            Some(index) => {
                self.selected = index;
                true
            }
            None => false,
        }
    }

    pub fn reset(&mut self) {
        self.selected = 0;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MaritalStatus {
    #[default]
    Any,
    Single,
    Married,
}

impl MaritalStatus {
    pub fn as_wire(self) -> &'static str {
        match self {
            MaritalStatus::Any => "",
            MaritalStatus::Single => "single",
            MaritalStatus::Married => "married",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MaritalStatus::Any => NO_RESTRICTION,
            MaritalStatus::Single => "미혼",
            MaritalStatus::Married => "기혼",
        }
    }
}

/// Detailed-search form state.
#[derive(Debug, Clone)]
pub struct FilterForm {
    pub query: String,
    pub exclude_closed: bool,
    pub marital_status: MaritalStatus,
    pub age: Option<u32>,
    /// Annual income bounds, in 10k KRW.
    pub income_min: Option<u32>,
    pub income_max: Option<u32>,
    pub region: RegionPicker,
    rows: [TagRow; 4],
}

impl Default for FilterForm {
    fn default() -> Self {
        Self {
            query: String::new(),
            exclude_closed: false,
            marital_status: MaritalStatus::Any,
            age: None,
            income_min: None,
            income_max: None,
            region: RegionPicker::new(),
            rows: TagRowKind::ALL.map(TagRow::new),
        }
    }
}

impl FilterForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row(&self, kind: TagRowKind) -> &TagRow {
        &self.rows[kind.index()]
    }

    pub fn rows(&self) -> &[TagRow] {
        &self.rows
    }

    pub fn select_tag(&mut self, kind: TagRowKind, option: &str) -> bool {
        self.rows[kind.index()].select(option)
    }

    /// Clears text fields and selects the first option of every row.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn to_request(&self) -> PolicySearchRequest {
        let tag = |kind: TagRowKind| vec![self.row(kind).selected().to_string()];
        let number = |value: Option<u32>| value.map(|v| v.to_string()).unwrap_or_default();

        PolicySearchRequest {
            query: self.query.trim().to_string(),
            exclude_closed: self.exclude_closed,
            region: self.region.region_key().to_string(),
            marital_status: self.marital_status.as_wire().to_string(),
            age: number(self.age),
            income_min: number(self.income_min),
            income_max: number(self.income_max),
            education: tag(TagRowKind::Education),
            major: tag(TagRowKind::Major),
            employment_status: tag(TagRowKind::EmploymentStatus),
            specialization: tag(TagRowKind::Specialization),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_start_unrestricted() {
        let form = FilterForm::new();
        for row in form.rows() {
            assert_eq!(row.selected(), NO_RESTRICTION);
        }
    }

    #[test]
    fn test_row_is_single_select() {
        let mut form = FilterForm::new();
        assert!(form.select_tag(TagRowKind::Major, "공학계열"));
        assert!(form.select_tag(TagRowKind::Major, "이학계열"));
        assert_eq!(form.row(TagRowKind::Major).selected(), "이학계열");
        assert_eq!(form.row(TagRowKind::Education).selected(), NO_RESTRICTION);
    }

    #[test]
    fn test_unknown_tag_keeps_selection() {
        let mut form = FilterForm::new();
        form.select_tag(TagRowKind::Education, "대학 재학");
        assert!(!form.select_tag(TagRowKind::Education, "유치원"));
        assert_eq!(form.row(TagRowKind::Education).selected(), "대학 재학");
    }

    #[test]
    fn test_to_request() {
        let mut form = FilterForm::new();
        form.query = "  월세 ".to_string();
        form.exclude_closed = true;
        form.marital_status = MaritalStatus::Single;
        form.age = Some(27);
        form.income_max = Some(3000);
        form.select_tag(TagRowKind::EmploymentStatus, "미취업자");
        form.region.select_province("seoul");
        form.region.select_district("관악구");

        let request = form.to_request();
        assert_eq!(request.query, "월세");
        assert!(request.exclude_closed);
        assert_eq!(request.region, "seoul");
        assert_eq!(request.marital_status, "single");
        assert_eq!(request.age, "27");
        assert_eq!(request.income_min, "");
        assert_eq!(request.income_max, "3000");
        assert_eq!(request.employment_status, vec!["미취업자"]);
        assert_eq!(request.education, vec![NO_RESTRICTION]);
    }

    #[test]
    fn test_reset() {
        let mut form = FilterForm::new();
        form.query = "취업".to_string();
        form.age = Some(30);
        form.select_tag(TagRowKind::Specialization, "여성");
        form.region.select_province("jeju");
        form.region.select_district("제주시");

        form.reset();

        assert!(form.query.is_empty());
        assert_eq!(form.age, None);
        assert_eq!(form.row(TagRowKind::Specialization).selected(), NO_RESTRICTION);
        assert!(form.region.tags().is_empty());
        assert_eq!(form.to_request().region, "");
    }
}
