/// District entry meaning "the whole province".
pub const ALL_DISTRICTS: &str = "전체";

/// Summary text when no region is picked.
pub const UNSELECTED_SUMMARY: &str = "선택하세요.";

#[derive(Debug, PartialEq, Eq)]
pub struct Province {
    pub key: &'static str,
    pub name: &'static str,
    pub districts: &'static [&'static str],
}

impl Province {
    pub fn find(key: &str) -> Option<&'static Province> {
        PROVINCES.iter().find(|p| p.key == key)
    }

    /// Looks up a province by key or Korean name.
    pub fn lookup(key_or_name: &str) -> Option<&'static Province> {
        PROVINCES
            .iter()
            .find(|p| p.key == key_or_name || p.name == key_or_name)
    }

    pub fn has_district(&self, district: &str) -> bool {
        self.districts.contains(&district)
    }
}

pub static PROVINCES: &[Province] = &[
    Province {
        key: "all",
        name: "전체",
        districts: &["전체"],
    },
    Province {
        key: "seoul",
        name: "서울",
        districts: &[
            "전체", "강남구", "강동구", "강북구", "강서구", "관악구", "광진구", "구로구", "금천구",
            "노원구", "도봉구", "동대문구", "동작구", "마포구", "서대문구", "서초구", "성동구",
            "성북구", "송파구", "양천구", "영등포구", "용산구", "은평구", "종로구", "중구", "중랑구",
        ],
    },
    Province {
        key: "busan",
        name: "부산",
        districts: &[
            "전체", "강서구", "금정구", "기장군", "남구", "동구", "동래구", "부산진구", "북구",
            "사상구", "사하구", "서구", "수영구", "연제구", "영도구", "중구", "해운대구",
        ],
    },
    Province {
        key: "daegu",
        name: "대구",
        districts: &[
            "전체", "남구", "달서구", "달성군", "동구", "북구", "서구", "수성구", "중구",
        ],
    },
    Province {
        key: "incheon",
        name: "인천",
        districts: &[
            "전체", "강화군", "계양구", "미추홀구", "남동구", "동구", "부평구", "서구", "연수구",
            "옹진군", "중구",
        ],
    },
    Province {
        key: "gwangju",
        name: "광주",
        districts: &["전체", "광산구", "남구", "동구", "북구", "서구"],
    },
    Province {
        key: "daejeon",
        name: "대전",
        districts: &["전체", "대덕구", "동구", "서구", "유성구", "중구"],
    },
    Province {
        key: "ulsan",
        name: "울산",
        districts: &["전체", "남구", "동구", "북구", "울주군", "중구"],
    },
    Province {
        key: "sejong",
        name: "세종",
        districts: &["전체"],
    },
    Province {
        key: "gyeonggi",
        name: "경기",
        districts: &[
            "전체", "가평군", "고양시", "과천시", "광명시", "광주시", "구리시", "군포시", "김포시",
            "남양주시", "동두천시", "부천시", "성남시", "수원시", "시흥시", "안산시", "안성시",
            "안양시", "양주시", "양평군", "여주시", "연천군", "오산시", "용인시", "의왕시",
            "의정부시", "이천시", "파주시", "평택시", "포천시", "하남시", "화성시",
        ],
    },
    Province {
        key: "gangwon",
        name: "강원",
        districts: &[
            "전체", "강릉시", "고성군", "동해시", "삼척시", "속초시", "양구군", "양양군", "영월군",
            "원주시", "인제군", "정선군", "철원군", "춘천시", "태백시", "평창군", "홍천군",
            "화천군", "횡성군",
        ],
    },
    Province {
        key: "chungbuk",
        name: "충북",
        districts: &[
            "전체", "괴산군", "단양군", "보은군", "영동군", "옥천군", "음성군", "제천시", "증평군",
            "진천군", "청주시", "충주시",
        ],
    },
    Province {
        key: "chungnam",
        name: "충남",
        districts: &[
            "전체", "계룡시", "공주시", "금산군", "논산시", "당진시", "보령시", "부여군", "서산시",
            "서천군", "아산시", "예산군", "천안시", "청양군", "태안군", "홍성군",
        ],
    },
    Province {
        key: "jeonbuk",
        name: "전북",
        districts: &[
            "전체", "고창군", "군산시", "김제시", "남원시", "무주군", "부안군", "순창군", "완주군",
            "익산시", "임실군", "장수군", "전주시", "정읍시", "진안군",
        ],
    },
    Province {
        key: "jeonnam",
        name: "전남",
        districts: &[
            "전체", "강진군", "고흥군", "곡성군", "광양시", "구례군", "나주시", "담양군", "목포시",
            "무안군", "보성군", "순천시", "신안군", "여수시", "영광군", "영암군", "완도군",
            "장성군", "장흥군", "진도군", "함평군", "해남군", "화순군",
        ],
    },
    Province {
        key: "gyeongbuk",
        name: "경북",
        districts: &[
            "전체", "경산시", "경주시", "고령군", "구미시", "군위군", "김천시", "문경시", "봉화군",
            "상주시", "성주군", "안동시", "영덕군", "영양군", "영주시", "영천시", "예천군",
            "울릉군", "울진군", "의성군", "청도군", "청송군", "칠곡군", "포항시",
        ],
    },
    Province {
        key: "gyeongnam",
        name: "경남",
        districts: &[
            "전체", "거제시", "거창군", "고성군", "김해시", "남해군", "밀양시", "사천시", "산청군",
            "양산시", "의령군", "진주시", "창녕군", "창원시", "통영시", "하동군", "함안군",
            "함양군", "합천군",
        ],
    },
    Province {
        key: "jeju",
        name: "제주",
        districts: &["전체", "서귀포시", "제주시"],
    },
];

/// One picked region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionTag {
    pub province: &'static str,
    pub province_name: &'static str,
    pub district: &'static str,
    pub display: String,
}

impl RegionTag {
    fn new(province: &'static Province, district: &'static str) -> Self {
        let display = if district == ALL_DISTRICTS {
            province.name.to_string()
        } else {
            format!("{} {district}", province.name)
        };
        Self {
            province: province.key,
            province_name: province.name,
            district,
            display,
        }
    }
}

/// Two-column province / district picker with a tag list.
#[derive(Debug, Clone, Default)]
pub struct RegionPicker {
    current: Option<&'static Province>,
    tags: Vec<RegionTag>,
}

impl RegionPicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shows the districts of `key`. Unknown keys leave the picker unchanged.
    pub fn select_province(&mut self, key: &str) -> Option<&'static Province> {
        let province = Province::find(key)?;
        self.current = Some(province);
        Some(province)
    }

    pub fn current_province(&self) -> Option<&'static Province> {
        self.current
    }

    pub fn districts(&self) -> &'static [&'static str] {
        match self.current {
            Some(province) => province.districts,
            None => &[],
        }
    }

    /// Adds a tag for `district` of the current province.
    ///
    /// Returns `false` when no province is shown, the district is unknown,
    /// or the same tag already exists.
    pub fn select_district(&mut self, district: &str) -> bool {
        let Some(province) = self.current else {
            return false;
        };
        let Some(district) = province.districts.iter().copied().find(|d| *d == district) else {
            return false;
        };
        if self
            .tags
            .iter()
            .any(|t| t.province == province.key && t.district == district)
        {
            return false;
        }
        self.tags.push(RegionTag::new(province, district));
        true
    }

    pub fn remove(&mut self, index: usize) -> Option<RegionTag> {
        (index < self.tags.len()).then(|| self.tags.remove(index))
    }

    pub fn reset(&mut self) {
        self.current = None;
        self.tags.clear();
    }

    pub fn tags(&self) -> &[RegionTag] {
        &self.tags
    }

    /// Text shown on the region field after applying the selection.
    pub fn summary(&self) -> String {
        match self.tags.as_slice() {
            [] => UNSELECTED_SUMMARY.to_string(),
            [only] => only.display.clone(),
            [first, rest @ ..] => format!("{} 외 {}곳", first.display, rest.len()),
        }
    }

    /// Province key sent with a search; only the first tag counts.
    pub fn region_key(&self) -> &'static str {
        self.tags.first().map_or("", |t| t.province)
    }
}
