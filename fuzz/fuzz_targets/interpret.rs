#![no_main]

use libfuzzer_sys::fuzz_target;
use tracefold::{ConsolidationEngine, Operation, OperationKind};

fuzz_target!(|input: Vec<Operation>| {
    let mut engine = ConsolidationEngine::new();
    engine.add_pattern(OperationKind::Swap).unwrap();

    // Malformed writes are reported, never misclassified
    if let Ok(output) = engine.interpret(&input) {
        let before: usize = input.iter().map(Operation::elementary_count).sum();
        let after: usize = output.iter().map(Operation::elementary_count).sum();
        assert_eq!(before, after);
        assert!(output.len() <= input.len());
    }
});
