//! Case labels and the closed word lists the construction rules consult

/// How a case-argument record is turned into graph structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Case {
    /// `ガ`, `ガ２`, ...: the argument acts through the predicate
    Subject,
    /// `ヲ`
    Object,
    /// `ニ`
    Goal,
    /// `カラ`
    Origin,
    /// `ヨリ`
    Comparison,
    /// `ト`
    Accompaniment,
    /// `ヘ`
    Direction,
    /// `外の関係`
    OtherRelation,
    /// `時間`
    Temporal,
    /// `デ`
    Instrumental,
}

impl Case {
    /// Classify a case-particle label; `None` for labels without a rule
    pub fn from_label(label: &str) -> Option<Self> {
        if label.starts_with('ガ') {
            return Some(Case::Subject);
        }
        match label {
            "ヲ" => Some(Case::Object),
            "ニ" => Some(Case::Goal),
            "カラ" => Some(Case::Origin),
            "ヨリ" => Some(Case::Comparison),
            "ト" => Some(Case::Accompaniment),
            "ヘ" => Some(Case::Direction),
            "外の関係" => Some(Case::OtherRelation),
            "時間" => Some(Case::Temporal),
            "デ" => Some(Case::Instrumental),
            _ => None,
        }
    }

    /// Cases drawn as an edge predicate → argument
    pub fn points_at_argument(self) -> bool {
        matches!(
            self,
            Case::Object
                | Case::Goal
                | Case::Origin
                | Case::Comparison
                | Case::Accompaniment
                | Case::Direction
                | Case::OtherRelation
        )
    }
}

/// Label of the comparison particle, also used as a predicate prefix
pub const COMPARISON_LABEL: &str = "ヨリ";

/// Nouns that express a spatial relation when linked with `の`
pub const LOCATION_TERMS: &[&str] = &[
    "上", "下", "前", "後ろ", "右", "左", "中", "外", "隣", "近く", "間", "上部", "下部", "右下",
    "右上", "左下", "左上",
];

/// Lexical subcategories that make a `の`-modifier an attribute of its head
pub const ATTRIBUTE_SUBCATEGORIES: &[&str] = &[
    "動物-部位",
    "植物-部位",
    "場所-施設部位",
    "形・模様",
    "色",
    "数量",
    "時間",
];

pub fn is_location_term(text: &str) -> bool {
    LOCATION_TERMS.contains(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_subject_labels_are_subjects() {
        assert_eq!(Case::from_label("ガ"), Some(Case::Subject));
        assert_eq!(Case::from_label("ガ２"), Some(Case::Subject));
    }

    #[test]
    fn unknown_labels_have_no_rule() {
        assert_eq!(Case::from_label("マデ"), None);
        assert_eq!(Case::from_label(""), None);
    }

    #[test]
    fn deferred_cases_do_not_point_at_argument() {
        assert!(Case::Object.points_at_argument());
        assert!(Case::OtherRelation.points_at_argument());
        assert!(!Case::Subject.points_at_argument());
        assert!(!Case::Temporal.points_at_argument());
        assert!(!Case::Instrumental.points_at_argument());
    }

    #[test]
    fn location_table() {
        assert!(is_location_term("上"));
        assert!(is_location_term("左上"));
        assert!(!is_location_term("テーブル"));
    }
}
