use qsfilter::vocabulary::Family;
use qsfilter::Vocabulary;

/// Custom vocabulary, using every option of the derive
#[derive(Vocabulary, Copy, Clone, Debug, Eq, PartialEq)]
#[vocabulary(prefix = "@")]
enum Accumulator {
    Sum,
    AddToSet,
    /// Explicit name
    #[vocabulary(rename = "first_n")]
    FirstN,
}

#[derive(Vocabulary, Copy, Clone, Debug, Eq, PartialEq)]
enum Bound {
    #[vocabulary(family = "Comparison")]
    Above,
    #[vocabulary(family = "Logical")]
    Either,
}

#[test]
fn test_names() {
    assert_eq!(Accumulator::Sum.name(), "@sum");
    assert_eq!(Accumulator::AddToSet.name(), "@addToSet");
    assert_eq!(Accumulator::AddToSet.keyword(), "addToSet");
    assert_eq!(Accumulator::FirstN.name(), "@first_n");
    assert_eq!(Accumulator::FirstN.to_string(), "@first_n");
}

#[test]
fn test_lookup() {
    assert_eq!(Accumulator::from_name("@addToSet"), Some(Accumulator::AddToSet));
    assert_eq!(Accumulator::from_name("addToSet"), None);
    assert_eq!(Accumulator::from_keyword("first_n"), Some(Accumulator::FirstN));
    assert_eq!(Accumulator::from_keyword("firstN"), None);
}

#[test]
fn test_all() {
    assert_eq!(
        Accumulator::ALL,
        &[Accumulator::Sum, Accumulator::AddToSet, Accumulator::FirstN]
    );
}

#[test]
fn test_families() {
    assert_eq!(Bound::Above.name(), "above");
    assert_eq!(Bound::Above.family(), Family::Comparison);
    assert_eq!(Bound::Either.family(), Family::Logical);
}
