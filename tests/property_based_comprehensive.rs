//! Property-based tests for the consolidation engine
//!
//! Core properties tested:
//! 1. Identity when no patterns are active
//! 2. Total coverage: expanding synthesized operations rebuilds the input
//! 3. Message transparency: messages keep their relative order
//! 4. Batch writes and other kinds always survive verbatim
//! 5. Termination and bounded output for arbitrary logs

use proptest::prelude::*;
use tracefold::operation::SwapOp;
use tracefold::{Address, ConsolidationEngine, Operation, OperationKind};

fn arb_address() -> impl Strategy<Value = Address> {
    prop::sample::select(vec!["a", "b", "c"]).prop_map(|name: &str| Address::new(name))
}

fn arb_value() -> impl Strategy<Value = f64> {
    (0u8..3).prop_map(f64::from)
}

fn arb_operation() -> impl Strategy<Value = Operation> {
    prop_oneof![
        4 => (arb_address(), arb_value()).prop_map(|(a, v)| Operation::read(a, v)),
        4 => (arb_address(), arb_value()).prop_map(|(a, v)| Operation::write(a, v)),
        1 => "[a-z]{1,6}".prop_map(Operation::message),
        1 => (arb_address(), prop::collection::vec(arb_value(), 2..4))
            .prop_map(|(a, vs)| Operation::batch_write(a, vs)),
        1 => arb_address().prop_map(Operation::remove),
    ]
}

/// A genuine exchange of two distinct cells
fn arb_swap_quartet() -> impl Strategy<Value = Vec<Operation>> {
    (arb_address(), arb_address(), arb_value(), arb_value())
        .prop_filter("distinct cells", |(x, y, _, _)| x != y)
        .prop_map(|(x, y, vx, vy)| {
            vec![
                Operation::read(x.clone(), vx),
                Operation::read(y.clone(), vy),
                Operation::write(x, vy),
                Operation::write(y, vx),
            ]
        })
}

/// Logs mixing arbitrary operations with embedded swap quartets
fn arb_log() -> impl Strategy<Value = Vec<Operation>> {
    prop::collection::vec(
        prop_oneof![
            3 => arb_operation().prop_map(|op| vec![op]),
            1 => arb_swap_quartet(),
        ],
        0..40,
    )
    .prop_map(|chunks| chunks.into_iter().flatten().collect())
}

/// Replace every swap by the four elementary operations it stands for
fn expand(ops: &[Operation]) -> Vec<Operation> {
    ops.iter()
        .flat_map(|op| match op {
            Operation::Swap(SwapOp {
                first,
                second,
                values: Some([x, y]),
            }) => vec![
                Operation::read(first.clone(), *x),
                Operation::read(second.clone(), *y),
                Operation::write(first.clone(), *y),
                Operation::write(second.clone(), *x),
            ],
            other => vec![other.clone()],
        })
        .collect()
}

fn without_messages(ops: &[Operation]) -> Vec<Operation> {
    ops.iter()
        .filter(|op| op.kind() != OperationKind::Message)
        .cloned()
        .collect()
}

fn only_messages(ops: &[Operation]) -> Vec<Operation> {
    ops.iter()
        .filter(|op| op.kind() == OperationKind::Message)
        .cloned()
        .collect()
}

fn swap_engine() -> ConsolidationEngine {
    let mut engine = ConsolidationEngine::new();
    engine.add_pattern(OperationKind::Swap).unwrap();
    engine
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_empty_registry_is_identity(input in arb_log()) {
        let engine = ConsolidationEngine::new();
        prop_assert_eq!(engine.interpret(&input).unwrap(), input);
    }

    #[test]
    fn prop_expansion_rebuilds_input(input in arb_log()) {
        let output = swap_engine().interpret(&input).unwrap();
        prop_assert_eq!(
            expand(&without_messages(&output)),
            without_messages(&input)
        );
    }

    #[test]
    fn prop_messages_keep_relative_order(input in arb_log()) {
        let output = swap_engine().interpret(&input).unwrap();
        prop_assert_eq!(only_messages(&output), only_messages(&input));
    }

    #[test]
    fn prop_elementary_count_is_preserved(input in arb_log()) {
        let result = swap_engine().interpret_with_stats(&input).unwrap();
        let elementary: usize = result.operations.iter().map(Operation::elementary_count).sum();

        prop_assert_eq!(elementary, input.len());
        prop_assert!(result.operations.len() <= input.len());
        prop_assert_eq!(result.stats.output_len, result.operations.len());
        prop_assert_eq!(
            result.stats.input_len - result.stats.output_len,
            result.stats.absorbed - result.stats.consolidated
        );
    }

    #[test]
    fn prop_non_participating_operations_survive(input in arb_log()) {
        let output = swap_engine().interpret(&input).unwrap();
        let standalone = |ops: &[Operation]| -> Vec<Operation> {
            ops.iter()
                .filter(|op| op.kind() == OperationKind::Remove || op.payload_len() > Some(1))
                .cloned()
                .collect()
        };
        prop_assert_eq!(standalone(&output), standalone(&input));
    }

    #[test]
    fn prop_message_inside_quartet_does_not_block_match(
        quartet in arb_swap_quartet(),
        at in 1usize..4,
        text in "[a-z]{1,6}",
    ) {
        let mut input = quartet;
        input.insert(at, Operation::message(text.clone()));

        let output = swap_engine().interpret(&input).unwrap();
        prop_assert_eq!(output.len(), 2);
        prop_assert_eq!(&output[0], &Operation::message(text));
        prop_assert_eq!(output[1].kind(), OperationKind::Swap);
    }

    #[test]
    fn prop_reads_only_never_consolidate(
        cells in prop::collection::vec((arb_address(), arb_value()), 0..60),
    ) {
        let input: Vec<Operation> = cells
            .into_iter()
            .map(|(a, v)| Operation::read(a, v))
            .collect();
        let result = swap_engine().interpret_with_stats(&input).unwrap();

        prop_assert_eq!(&result.operations, &input);
        prop_assert_eq!(result.stats.committed, input.len().saturating_sub(4));
    }
}
