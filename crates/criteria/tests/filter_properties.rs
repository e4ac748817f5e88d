//! Property sweeps over generated filters.
//!
//! Trees are generated from a fixed seed so failures reproduce, and each
//! tree is checked against every object in a small exhaustive domain.
//!
//! Run with: cargo test --package criteria-rs --test filter_properties

use criteria_rs::filter::{Connective, Decimal, Filter, FilterParser, Number, Operand, Operator};
use criteria_rs::{matches, parse, serialize, sort, try_split_into_chunks, FilterError};
use serde_json::{json, Value};
use uuid::Uuid;

// ============================================================================
// Generators
// ============================================================================

/// Small xorshift generator; deterministic across runs.
struct Rng(u64);

impl Rng {
    fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    fn below(&mut self, bound: usize) -> usize {
        (self.next() % bound as u64) as usize
    }

    fn pick<T: Copy>(&mut self, items: &[T]) -> T {
        items[self.below(items.len())]
    }
}

const FIELDS: [&str; 3] = ["A", "B", "C"];

/// Text values in the domain; the escaped characters must survive a round trip.
const TEXTS: [&str; 6] = ["x", "y", "a\"b", "back\\slash", "trail\\", "\\"];

/// UUIDs in the domain, stored as text under `U`.
const UUIDS: [u128; 3] = [
    0x0000_0000_0000_4000_8000_0000_0000_0001,
    0x6f1c_2b7e_9a4d_4c3b_8e5f_1a2b_3c4d_5e6f,
    0xffff_ffff_ffff_4fff_bfff_ffff_ffff_ffff,
];

/// Number literals of every width, including float extremes and non-finite values.
fn number_operands() -> Vec<Number> {
    let decimal = |text: &str| Number::Decimal(text.parse::<Decimal>().unwrap());
    vec![
        Number::U8(u8::MAX),
        Number::I8(i8::MIN),
        Number::U16(u16::MAX),
        Number::I16(i16::MIN),
        Number::U32(u32::MAX),
        Number::I32(i32::MIN),
        Number::U64(u64::MAX),
        Number::I64(i64::MIN),
        decimal("1.50"),
        decimal("-0.001"),
        decimal("9999999999999999999999999999.99"),
        Number::F32(f32::MAX),
        Number::F32(1.5),
        Number::F32(-0.25),
        Number::F64(1e40),
        Number::F64(f64::MAX),
        Number::F64(1e-300),
        Number::F64(f64::MIN_POSITIVE),
        Number::F64(-2.5),
        Number::F64(f64::INFINITY),
        Number::F64(f64::NEG_INFINITY),
        Number::F64(f64::NAN),
    ]
}

fn random_condition(rng: &mut Rng) -> Filter {
    let field = rng.pick(&FIELDS);
    let condition = match rng.below(9) {
        0 => Filter::null_comparison("T", rng.pick(&[Operator::Equal, Operator::NotEqual])),
        1 => Filter::condition(
            "T",
            rng.pick(&[Operator::Equal, Operator::Contains, Operator::StartsWith]),
            rng.pick(&["x", "X", "y", ""]),
        ),
        2 => Filter::condition(
            "T",
            rng.pick(&Operator::ALL),
            rng.pick(&["a\"b", "back\\slash", "trail\\", "\\", "\"", "say \"hi\""]),
        ),
        3 => {
            let numbers = number_operands();
            let number = numbers[rng.below(numbers.len())].clone();
            Filter::condition(field, rng.pick(&Operator::ALL), number)
        }
        4 => Filter::condition(
            "U",
            rng.pick(&[Operator::Equal, Operator::NotEqual, Operator::StartsWith]),
            Uuid::from_u128(rng.pick(&UUIDS)),
        ),
        5 => Filter::condition(
            "F",
            rng.pick(&[Operator::Equal, Operator::GreaterThan]),
            rng.below(2) == 0,
        ),
        6 => Filter::field_comparison(field, rng.pick(&Operator::ALL), rng.pick(&FIELDS)),
        _ => Filter::condition(field, rng.pick(&Operator::ALL), rng.below(3) as u8),
    };
    condition.unwrap()
}

fn random_chain(rng: &mut Rng, depth: usize) -> Filter {
    let length = 1 + rng.below(4);
    (0..length).fold(Filter::empty(), |chain, _| {
        let next = if depth > 0 && rng.below(4) == 0 {
            random_chain(rng, depth - 1).grouped()
        } else {
            random_condition(rng)
        };
        if rng.below(2) == 0 {
            chain.and(&next)
        } else {
            chain.or(&next)
        }
    })
}

fn random_trees(seed: u64, count: usize) -> Vec<Filter> {
    let mut rng = Rng(seed);
    (0..count).map(|_| random_chain(&mut rng, 2)).collect()
}

/// Every object over numeric fields A, B, C in 0..3, text T, and flag F.
///
/// U holds a UUID as text, uppercased for one of them.
fn domain() -> Vec<Value> {
    let texts = TEXTS.iter().map(|t| json!(t)).chain([Value::Null]);
    let texts: Vec<Value> = texts.collect();
    let mut objects = Vec::new();
    for a in 0..3 {
        for b in 0..3 {
            let uuid = Uuid::from_u128(UUIDS[b]).hyphenated().to_string();
            let uuid = if b == 1 { uuid.to_uppercase() } else { uuid };
            for c in 0..3 {
                for t in &texts {
                    objects.push(json!({
                        "A": a,
                        "B": b,
                        "C": c,
                        "T": t,
                        "U": uuid,
                        "F": (a + c) % 2 == 0,
                    }));
                }
            }
        }
    }
    objects
}

fn outcomes(filter: &Filter, objects: &[Value]) -> Vec<bool> {
    objects.iter().map(|o| matches(filter, o).unwrap()).collect()
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn round_trip_preserves_text_and_matches() {
    let objects = domain();
    for tree in random_trees(0x5eed_0001, 200) {
        let text = serialize(&tree);
        let reparsed = parse(&text).unwrap_or_else(|e| panic!("{text}: {e}"));
        assert_eq!(serialize(&reparsed), text);
        assert_eq!(outcomes(&reparsed, &objects), outcomes(&tree, &objects), "{text}");
    }
}

#[test]
fn empty_is_identity_for_and_or() {
    let empty = Filter::empty();
    for tree in random_trees(0x5eed_0002, 100) {
        let text = tree.to_string();
        assert_eq!(tree.and(&empty).to_string(), text);
        assert_eq!(empty.and(&tree).to_string(), text);
        assert_eq!(tree.or(&empty).to_string(), text);
        assert_eq!(empty.or(&tree).to_string(), text);
    }
}

#[test]
fn sort_is_idempotent_and_preserves_matches() {
    let objects = domain();
    for tree in random_trees(0x5eed_0003, 200) {
        let sorted = sort(&tree);
        assert_eq!(sort(&sorted).to_string(), sorted.to_string(), "{tree}");
        assert_eq!(outcomes(&sorted, &objects), outcomes(&tree, &objects), "{tree}");
    }
}

#[test]
fn split_reconstructs_or_chains() {
    let objects = domain();
    let mut rng = Rng(0x5eed_0004);
    for _ in 0..50 {
        let length = 2 + rng.below(12);
        let chain = (0..length).fold(Filter::empty(), |chain, _| {
            chain.or(&random_condition(&mut rng))
        });
        let chunk_size = 1 + rng.below(length - 1);

        let chunks = try_split_into_chunks(&chain, chunk_size).unwrap();
        assert!(chunks.iter().all(|c| c.condition_count() <= chunk_size));
        assert_eq!(chunks.iter().map(Filter::len).sum::<usize>(), length);

        for object in &objects {
            let any = chunks.iter().any(|c| matches(c, object).unwrap());
            assert_eq!(any, matches(&chain, object).unwrap(), "{chain}");
        }
    }
}

#[test]
fn split_refuses_chains_with_and_or_groups() {
    for tree in random_trees(0x5eed_0005, 200) {
        let has_and = tree.iter().any(|c| c.connective() == Connective::And);
        let has_group = tree.iter().any(|c| c.is_group());
        if has_and || has_group {
            assert!(try_split_into_chunks(&tree, 1).is_none(), "{tree}");
        }
    }
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn scenario_single_text_condition() {
    let filter = parse("[Name] == \"Alice\"").unwrap();
    assert_eq!(filter.len(), 1);

    let condition = filter.clauses()[0].as_condition().unwrap();
    assert_eq!(condition.field().to_string(), "Name");
    assert_eq!(condition.operator(), Operator::Equal);
    assert_eq!(condition.operand(), &Operand::Text("Alice".to_string()));

    assert!(matches(&filter, &json!({ "Name": "alice" })).unwrap());
}

#[test]
fn scenario_and_chain_round_trips_exactly() {
    let text = "[Age] > 30 AND [Age] < 40";
    let filter = parse(text).unwrap();
    assert_eq!(filter.len(), 2);
    assert_eq!(filter.clauses()[1].connective(), Connective::And);
    assert_eq!(serialize(&filter), text);
}

#[test]
fn scenario_group_followed_by_and() {
    let filter = parse("([A] == 1 OR [B] == 2) AND [C] == TRUE").unwrap();
    assert!(filter.clauses()[0].is_group());
    assert_eq!(filter.clauses()[1].connective(), Connective::And);
    assert!(matches(&filter, &json!({ "A": 1, "C": true })).unwrap());
    assert!(!matches(&filter, &json!({ "A": 1, "C": false })).unwrap());
}

#[test]
fn scenario_null_text_target() {
    let filter = Filter::condition("X", Operator::Equal, None::<String>).unwrap();
    assert_eq!(filter.to_string(), "[X] == NULL");
    assert!(matches(&filter, &json!({ "X": null })).unwrap());
    assert!(!matches(&filter, &json!({ "X": "v" })).unwrap());
}

#[test]
fn scenario_split_250_by_100() {
    let chain = (0..250u32).fold(Filter::empty(), |chain, id| {
        chain.or(&Filter::condition("Id", Operator::Equal, id).unwrap())
    });
    let chunks = try_split_into_chunks(&chain, 100).unwrap();
    let sizes: Vec<usize> = chunks.iter().map(Filter::len).collect();
    assert_eq!(sizes, vec![100, 100, 50]);

    for id in -5..260 {
        let object = json!({ "Id": id });
        let any = chunks.iter().any(|c| matches(c, &object).unwrap());
        assert_eq!(any, matches(&chain, &object).unwrap(), "Id {id}");
    }
}

#[test]
fn scenario_missing_closing_bracket() {
    let err = FilterParser::parse("[Name == \"Alice\"").unwrap_err();
    assert!(err.is_syntax());
    assert!(matches!(err, FilterError::Syntax { .. }));
}
