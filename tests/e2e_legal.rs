//! End-to-end legal-person scenarios: dates in, derived age out, person
//! class through the perceptive frame entry point.

use std::sync::Arc;

use notions::legal::{
    self, NF_ACTUAL_DATE, NF_DATE_OF_BIRTH, NF_LEGAL_AGE, NF_LEGAL_GENDER, PF_LEGAL, PersonClass,
};
use notions::model::{Arg, ArgMap, NotionValue, Value};
use notions::{Catalog, GroupClass, ValuesByFrame};

fn args(pairs: Vec<(&str, Arg)>) -> ArgMap {
    pairs.into_iter().map(|(k, v)| (k.to_owned(), v)).collect()
}

fn person_values(
    catalog: &Catalog,
    born: &str,
    today: &str,
    gender: &str,
) -> (Arc<NotionValue>, Arc<NotionValue>) {
    let dob = catalog
        .create_value(NF_DATE_OF_BIRTH, args(vec![("date_of_birth", Arg::from(born))]))
        .unwrap();
    let actual = catalog
        .create_value(NF_ACTUAL_DATE, args(vec![("actual_date", Arg::from(today))]))
        .unwrap();
    let age = catalog
        .create_value(
            NF_LEGAL_AGE,
            args(vec![
                ("NF_Date_of_birth", Arg::Ref(dob)),
                ("NF_Actual_date", Arg::Ref(actual)),
            ]),
        )
        .unwrap();
    let gender = catalog
        .create_value(
            NF_LEGAL_GENDER,
            args(vec![(
                "legal_gender",
                Arg::Literal(Value::Symbol(gender.into())),
            )]),
        )
        .unwrap();
    (age, gender)
}

fn classify(catalog: &Catalog, age: Arc<NotionValue>, gender: Arc<NotionValue>) -> PersonClass {
    let mut values = ValuesByFrame::new();
    values.insert(NF_LEGAL_AGE.into(), vec![age].into());
    values.insert(NF_LEGAL_GENDER.into(), vec![gender].into());
    let group = catalog.group(PF_LEGAL).unwrap();
    match group.classify(catalog, &values, None).unwrap() {
        Some(GroupClass::Person(p)) => p,
        other => panic!("expected a person class, got {other:?}"),
    }
}

// ============================================================================
// 1. Derivation: age computed from the two date values
// ============================================================================

#[test]
fn test_age_is_derived_from_dates() {
    let catalog = Catalog::new();
    legal::install(&catalog).unwrap();

    let (age, _) = person_values(&catalog, "1990-04-02", "2024-06-01", "FEMALE");
    assert_eq!(age.prop("legal_age"), Some(&Value::Int(34)));
    assert_eq!(age.classification, Some(Value::Symbol("ADULT".into())));

    // Both date values are reachable through the derived-value traversal.
    let derived = age.derived_values();
    assert_eq!(derived.len(), 2);
}

// ============================================================================
// 2. Person classes across the age/gender grid
// ============================================================================

#[test]
fn test_adult_female_is_woman() {
    let catalog = Catalog::new();
    legal::install(&catalog).unwrap();
    let (age, gender) = person_values(&catalog, "1990-04-02", "2024-06-01", "FEMALE");
    assert_eq!(classify(&catalog, age, gender), PersonClass::Woman);
}

#[test]
fn test_minor_male_is_boy() {
    let catalog = Catalog::new();
    legal::install(&catalog).unwrap();
    let (age, gender) = person_values(&catalog, "2010-01-15", "2024-06-01", "MALE");
    assert_eq!(classify(&catalog, age, gender), PersonClass::Boy);
}

#[test]
fn test_eighteenth_birthday_is_adult() {
    let catalog = Catalog::new();
    legal::install(&catalog).unwrap();
    let (age, gender) = person_values(&catalog, "2006-06-01", "2024-06-01", "MALE");
    assert_eq!(age.prop("legal_age"), Some(&Value::Int(18)));
    assert_eq!(classify(&catalog, age, gender), PersonClass::Man);
}

// ============================================================================
// 3. Instance view: direct plus derived values
// ============================================================================

#[test]
fn test_instance_all_values_includes_dates() {
    let catalog = Catalog::new();
    legal::install(&catalog).unwrap();

    let (age, gender) = person_values(&catalog, "1985-12-24", "2024-06-01", "FEMALE");
    let instance = catalog
        .create_instance("person:ada", Some(PF_LEGAL), vec![age, gender])
        .unwrap();

    // age + gender direct, dob + actual_date derived.
    assert_eq!(instance.all_values().len(), 4);
}

// ============================================================================
// 4. Bad input surfaces as an explicit failure
// ============================================================================

#[test]
fn test_malformed_date_fails_construction() {
    let catalog = Catalog::new();
    legal::install(&catalog).unwrap();
    let err = catalog
        .create_value(NF_DATE_OF_BIRTH, args(vec![("date_of_birth", Arg::from("soon"))]))
        .unwrap_err();
    assert!(matches!(err, notions::Error::InvalidDate { .. }));
}

#[test]
fn test_non_string_birth_date_is_a_type_error() {
    let catalog = Catalog::new();
    legal::install(&catalog).unwrap();
    let err = catalog
        .create_value(
            NF_DATE_OF_BIRTH,
            args(vec![("date_of_birth", Arg::Literal(Value::Int(19900402)))]),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        notions::Error::ArgumentType {
            expected: "STRING",
            got: "INTEGER",
            ..
        }
    ));
}

#[test]
fn test_reference_where_literal_expected_is_a_type_error() {
    let catalog = Catalog::new();
    legal::install(&catalog).unwrap();
    let dob = catalog
        .create_value(NF_DATE_OF_BIRTH, args(vec![("date_of_birth", Arg::from("1990-04-02"))]))
        .unwrap();
    let err = catalog
        .create_value(NF_DATE_OF_BIRTH, args(vec![("date_of_birth", Arg::Ref(dob))]))
        .unwrap_err();
    assert!(matches!(
        err,
        notions::Error::ArgumentType { got: "VALUE", .. }
    ));
}

// ============================================================================
// 5. Classification failure modes
// ============================================================================

#[test]
fn test_missing_age_value_is_reported() {
    let catalog = Catalog::new();
    legal::install(&catalog).unwrap();
    let (_, gender) = person_values(&catalog, "1990-04-02", "2024-06-01", "FEMALE");

    let mut values = ValuesByFrame::new();
    values.insert(NF_LEGAL_GENDER.into(), vec![gender].into());
    let group = catalog.group(PF_LEGAL).unwrap();
    assert!(matches!(
        group.classify(&catalog, &values, None),
        Err(notions::Error::MissingArgument { key, .. }) if key == NF_LEGAL_AGE
    ));
}

#[test]
fn test_unknown_gender_token_is_reported() {
    let catalog = Catalog::new();
    legal::install(&catalog).unwrap();
    let (age, gender) = person_values(&catalog, "1990-04-02", "2024-06-01", "OTHER");

    let mut values = ValuesByFrame::new();
    values.insert(NF_LEGAL_AGE.into(), vec![age].into());
    values.insert(NF_LEGAL_GENDER.into(), vec![gender].into());
    let group = catalog.group(PF_LEGAL).unwrap();
    assert!(matches!(
        group.classify(&catalog, &values, None),
        Err(notions::Error::UnknownToken { token, .. }) if token == "OTHER"
    ));
}
