use std::num::NonZeroUsize;

/// One bounded slice of the normalized input, numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Batch<'a, T> {
    pub number: usize,
    pub total: usize,
    pub records: &'a [T],
}

impl<T> Batch<'_, T> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_last(&self) -> bool {
        self.number == self.total
    }
}

/// Split `records` into order-preserving batches of `size`; only the last may be shorter.
pub fn batches<T>(records: &[T], size: NonZeroUsize) -> Vec<Batch<'_, T>> {
    let total = records.len().div_ceil(size.get());
    records
        .chunks(size.get())
        .enumerate()
        .map(|(idx, chunk)| Batch {
            number: idx + 1,
            total,
            records: chunk,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nz(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn empty_input_yields_no_batches() {
        assert!(batches::<u32>(&[], nz(10)).is_empty());
    }

    #[test]
    fn sizes_and_order_hold_for_many_lengths() {
        for size in [1usize, 3, 10, 20, 25, 50] {
            for len in 0usize..=120 {
                let input: Vec<usize> = (0..len).collect();
                let out = batches(&input, nz(size));

                assert_eq!(out.len(), len.div_ceil(size), "len={len} size={size}");
                for (i, b) in out.iter().enumerate() {
                    assert_eq!(b.number, i + 1);
                    assert_eq!(b.total, out.len());
                    assert!(!b.is_empty());
                    if !b.is_last() {
                        assert_eq!(b.len(), size);
                    }
                }
                if let Some(last) = out.last() {
                    assert_eq!(last.len(), len - size * ((len - 1) / size));
                }
                let rejoined: Vec<usize> =
                    out.iter().flat_map(|b| b.records.iter().copied()).collect();
                assert_eq!(rejoined, input);
            }
        }
    }
}
