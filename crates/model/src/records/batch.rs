use std::num::NonZeroUsize;

/// What the buffer tells its producer after accepting a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchSignal {
    /// Below the watermark, keep feeding.
    Accepting,
    /// Watermark reached; the producer must stop until the batch is drained.
    Ready,
}

/// An ordered, append-only run of encoded records bounded by a watermark.
///
/// The buffer is reused across batches of one chunk: `clear` empties it and
/// advances the batch sequence number.
#[derive(Debug, Clone)]
pub struct Batch {
    records: Vec<String>,
    watermark: NonZeroUsize,
    bytes: usize,
    sequence: u64,
}

impl Batch {
    pub fn new(watermark: NonZeroUsize) -> Self {
        Self {
            records: Vec::with_capacity(watermark.get().min(64 * 1024)),
            watermark,
            bytes: 0,
            sequence: 1,
        }
    }

    pub fn push(&mut self, record: String) -> BatchSignal {
        self.bytes += record.len();
        self.records.push(record);

        if self.is_ready() {
            BatchSignal::Ready
        } else {
            BatchSignal::Accepting
        }
    }

    pub fn is_ready(&self) -> bool {
        self.records.len() >= self.watermark.get()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn records(&self) -> &[String] {
        &self.records
    }

    pub fn size_bytes(&self) -> usize {
        self.bytes
    }

    /// 1-based number of the batch currently being accumulated.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.bytes = 0;
        self.sequence += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn watermark(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn signals_ready_exactly_at_watermark() {
        let mut batch = Batch::new(watermark(3));
        assert_eq!(batch.push("a\n".into()), BatchSignal::Accepting);
        assert_eq!(batch.push("b\n".into()), BatchSignal::Accepting);
        assert_eq!(batch.push("c\n".into()), BatchSignal::Ready);
        assert!(batch.is_ready());
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.size_bytes(), 6);
    }

    #[test]
    fn clear_resets_contents_and_advances_sequence() {
        let mut batch = Batch::new(watermark(1));
        assert_eq!(batch.sequence(), 1);
        assert_eq!(batch.push("a\n".into()), BatchSignal::Ready);

        batch.clear();

        assert!(batch.is_empty());
        assert_eq!(batch.size_bytes(), 0);
        assert_eq!(batch.sequence(), 2);
        assert!(!batch.is_ready());
    }

    #[test]
    fn preserves_insertion_order() {
        let mut batch = Batch::new(watermark(10));
        for i in 0..5 {
            batch.push(format!("{i}\n"));
        }
        let joined: String = batch.records().concat();
        assert_eq!(joined, "0\n1\n2\n3\n4\n");
    }
}
