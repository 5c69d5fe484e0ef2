//! Legal-person frames: age and gender derivation and the person
//! classification built on them. The second domain served by the engine,
//! alongside [`crate::topology`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use smallvec::smallvec;

use crate::catalog::Catalog;
use crate::convert::{Classifier, Converter};
use crate::group::{GroupClassifier, GroupId, GroupSpec, ValuesByFrame};
use crate::model::{FrameSpec, NotionType, NotionUnit, Value};
use crate::{Error, Result};

pub const NF_DATE_OF_BIRTH: &str = "NF_Date_of_birth";
pub const NF_ACTUAL_DATE: &str = "NF_Actual_date";
pub const NF_LEGAL_AGE: &str = "NF_Legal_age";
pub const NF_LEGAL_GENDER: &str = "NF_Legal_gender";
pub const PF_LEGAL: &str = "PF_Legal";

/// Age of majority in years.
const ADULT_AGE: i64 = 18;

// ============================================================================
// Classification enums
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgeClass {
    Child,
    Adult,
}

impl AgeClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgeClass::Child => "CHILD",
            AgeClass::Adult => "ADULT",
        }
    }
}

/// Person category by legal age and gender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PersonClass {
    Woman,
    Man,
    Girl,
    Boy,
}

impl fmt::Display for PersonClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PersonClass::Woman => "WOMAN",
            PersonClass::Man => "MAN",
            PersonClass::Girl => "GIRL",
            PersonClass::Boy => "BOY",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Gender {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, String> {
        match s {
            "MALE" => Ok(Gender::Male),
            "FEMALE" => Ok(Gender::Female),
            other => Err(other.to_owned()),
        }
    }
}

impl FromStr for AgeClass {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, String> {
        match s {
            "CHILD" => Ok(AgeClass::Child),
            "ADULT" => Ok(AgeClass::Adult),
            other => Err(other.to_owned()),
        }
    }
}

// ============================================================================
// Frame registration
// ============================================================================

/// Register the legal frames and the person classifier.
pub fn install(catalog: &Catalog) -> Result<()> {
    for (id, parameter) in [
        (NF_DATE_OF_BIRTH, "date_of_birth"),
        (NF_ACTUAL_DATE, "actual_date"),
    ] {
        catalog.register_frame(FrameSpec {
            id: id.into(),
            parameter: parameter.into(),
            notion_type: NotionType::Date,
            unit: NotionUnit::Day,
            derived_from: smallvec![],
            converter: Converter::ParseDate {
                key: parameter.into(),
            },
            classifier: Classifier::Never,
        })?;
    }

    catalog.register_frame(FrameSpec {
        id: NF_LEGAL_AGE.into(),
        parameter: "legal_age".into(),
        notion_type: NotionType::Duration,
        unit: NotionUnit::Year,
        derived_from: smallvec![NF_DATE_OF_BIRTH.into(), NF_ACTUAL_DATE.into()],
        converter: Converter::YearsBetween {
            key: "legal_age".into(),
            start: "date_of_birth".into(),
            end: "actual_date".into(),
        },
        classifier: Classifier::Threshold {
            key: "legal_age".into(),
            cutoff: ADULT_AGE,
            below: Value::Symbol(AgeClass::Child.as_str().to_owned()),
            at_or_above: Value::Symbol(AgeClass::Adult.as_str().to_owned()),
        },
    })?;

    catalog.register_frame(FrameSpec {
        id: NF_LEGAL_GENDER.into(),
        parameter: "legal_gender".into(),
        notion_type: NotionType::Enumeration,
        unit: NotionUnit::None,
        derived_from: smallvec![],
        converter: Converter::Identity {
            key: "legal_gender".into(),
        },
        classifier: Classifier::Echo {
            key: "legal_gender".into(),
        },
    })?;

    catalog.register_group(GroupSpec {
        id: PF_LEGAL.into(),
        members: vec![NF_LEGAL_AGE.into(), NF_LEGAL_GENDER.into()],
        classifier: GroupClassifier::LegalPerson,
    })?;

    Ok(())
}

// ============================================================================
// Person classification
// ============================================================================

/// Classify a person from a legal-age value and a legal-gender value.
pub fn classify_person(group: &GroupId, values: &ValuesByFrame) -> Result<Option<PersonClass>> {
    let age_value = values
        .get(NF_LEGAL_AGE)
        .and_then(|l| l.first())
        .ok_or_else(|| Error::MissingArgument {
            frame: group.to_string(),
            key: NF_LEGAL_AGE.to_owned(),
        })?;
    let age_class = age_value
        .classification
        .as_ref()
        .and_then(Value::as_symbol)
        .and_then(|s| s.parse::<AgeClass>().ok())
        .ok_or_else(|| Error::UnknownToken {
            frame: group.to_string(),
            token: format!("{:?}", age_value.classification),
        })?;

    let gender_value = values
        .get(NF_LEGAL_GENDER)
        .and_then(|l| l.first())
        .ok_or_else(|| Error::MissingArgument {
            frame: group.to_string(),
            key: NF_LEGAL_GENDER.to_owned(),
        })?;
    let gender_token = gender_value
        .prop("legal_gender")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::MissingArgument {
            frame: group.to_string(),
            key: "legal_gender".to_owned(),
        })?;
    let gender = gender_token
        .parse::<Gender>()
        .map_err(|token| Error::UnknownToken {
            frame: group.to_string(),
            token,
        })?;

    Ok(Some(match (gender, age_class) {
        (Gender::Female, AgeClass::Adult) => PersonClass::Woman,
        (Gender::Female, AgeClass::Child) => PersonClass::Girl,
        (Gender::Male, AgeClass::Adult) => PersonClass::Man,
        (Gender::Male, AgeClass::Child) => PersonClass::Boy,
    }))
}
