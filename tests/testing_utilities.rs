//! Tests and examples for the testing utilities
//!
//! This suite shows the assertion macros against a small sign-up form.

use weir::prelude::*;
use weir::rule::{each, length, required, string_in};
use weir::testing::{equals, fault};
use weir::{assert_error_text, assert_invalid, assert_valid};

// Example domain: a sign-up form and the object it may embed.
#[derive(Debug, Clone)]
struct Address {
    city: String,
    zip: String,
}

impl Validatable for Address {
    fn validate(&self) -> Result<(), Error> {
        let fields = Value::from([("City", self.city.as_str()), ("Zip", self.zip.as_str())]);
        validate_map(&fields, &address_rule(), None)
    }
}

fn address_rule() -> MapRule {
    map(vec![
        key!("City", required()),
        key!("Zip", required(), length(5, 5)),
    ])
}

fn signup_rule() -> MapRule {
    map(vec![
        key!("Email", required(), length(3, 64)),
        key!("Plan", required(), string_in(false, ["free", "pro"])),
        key!("Tags", each(rules![length(1, 8)])).optional(),
        key!("Address").optional(),
    ])
}

fn signup(email: &str, plan: &str) -> ValueMap {
    let mut form = ValueMap::new();
    form.insert("Email", email);
    form.insert("Plan", plan);
    form
}

// ============================================================================
// assert_valid!
// ============================================================================

#[test]
fn valid_form_passes() {
    assert_valid!(validate_map(&Value::from(signup("a@b.c", "free")), &signup_rule(), None));
}

#[test]
fn valid_form_with_optional_parts_passes() {
    let mut form = signup("a@b.c", "PRO");
    form.insert("Tags", vec!["beta", "ops"]);
    form.insert(
        "Address",
        Value::object(Address {
            city: "Oslo".into(),
            zip: "01500".into(),
        }),
    );
    assert_valid!(validate_map(&Value::from(form), &signup_rule(), None));
}

// ============================================================================
// assert_invalid!
// ============================================================================

#[test]
fn unknown_plan_is_a_violation() {
    assert_invalid!(validate_map(&Value::from(signup("a@b.c", "gold")), &signup_rule(), None));
}

#[test]
fn extra_field_is_a_violation() {
    let mut form = signup("a@b.c", "free");
    form.insert("Referrer", "x");
    assert_invalid!(validate_map(&Value::from(form), &signup_rule(), None));
}

// ============================================================================
// assert_error_text!
// ============================================================================

#[test]
fn all_violations_are_reported_together() {
    let mut form = signup("", "gold");
    form.insert("Tags", vec!["ok", "much-too-long"]);
    assert_error_text!(
        validate_map(&Value::from(form), &signup_rule(), None),
        "Email: cannot be blank; Plan: must be a valid value; Tags: (1: the length must be between 1 and 8.)."
    );
}

#[test]
fn embedded_object_errors_are_nested() {
    let mut form = signup("a@b.c", "free");
    form.insert(
        "Address",
        Value::object(Address {
            city: String::new(),
            zip: "123".into(),
        }),
    );
    assert_error_text!(
        validate_map(&Value::from(form), &signup_rule(), None),
        "Address: (City: cannot be blank; Zip: the length must be exactly 5.)."
    );
}

#[test]
fn empty_expectation_means_valid() {
    assert_error_text!(validate(&Value::from("xyz"), &rules![equals("xyz")]), "");
}

// ============================================================================
// Canned rules
// ============================================================================

#[test]
fn fault_rule_aborts_the_form() {
    let rule = signup_rule().key(key!("Debug", fault("error internal")));
    let mut form = signup("", "free");
    form.insert("Debug", true);
    let err = validate_map(&Value::from(form), &rule, None).unwrap_err();
    assert!(err.is_internal());
    assert_eq!(err.to_string(), "error internal");
}

#[test]
#[should_panic(expected = "Expected valid, got error")]
fn assert_valid_reports_the_error() {
    assert_valid!(validate_map(&Value::from(signup("", "free")), &signup_rule(), None));
}

#[test]
#[should_panic]
fn assert_error_text_rejects_wrong_text() {
    assert_error_text!(
        validate_map(&Value::from(signup("", "free")), &signup_rule(), None),
        "Email: is required."
    );
}
