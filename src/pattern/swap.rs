use super::Consolidable;
use crate::operation::{Operation, OperationKind, ReadWrite, SwapOp};

/// Read-read-write-write exchange of two cells
///
/// Matches `[read A, read B, write A, write B]` with `A != B`. Writes must
/// cross the reads (`write A == read B`, `write B == read A`) wherever both
/// sides of a comparison carry a value; unknown values only constrain the
/// address shape.
#[derive(Debug, Clone, Copy, Default)]
pub struct SwapPattern;

impl SwapPattern {
    const SIZE: usize = 4;
}

impl Consolidable for SwapPattern {
    fn kind(&self) -> OperationKind {
        OperationKind::Swap
    }

    fn atomic_operation_count(&self) -> usize {
        Self::SIZE
    }

    fn try_consolidate(&self, window: &[ReadWrite]) -> Option<Operation> {
        let [r1, r2, w1, w2] = window else {
            return None;
        };

        let first = &r1.as_read()?.source;
        let second = &r2.as_read()?.source;
        if first == second {
            return None;
        }
        if &w1.as_write()?.target != first || &w2.as_write()?.target != second {
            return None;
        }

        let (a, b) = (r1.value(), r2.value());
        // Each write whose value and crossing read are both known must cross
        if matches!((w1.value(), b), (Some(wa), Some(b)) if wa != b)
            || matches!((w2.value(), a), (Some(wb), Some(a)) if wb != a)
        {
            return None;
        }
        let values = a.zip(b).map(|(a, b)| [a, b]);

        Some(Operation::Swap(SwapOp {
            first: first.clone(),
            second: second.clone(),
            values,
        }))
    }
}
