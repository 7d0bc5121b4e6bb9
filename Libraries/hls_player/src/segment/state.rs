use crate::playlist::RangeUrl;
use std::collections::VecDeque;

/// Fetch bookkeeping of one playback session.
///
/// A segment stays in `pending` while it is in flight and moves to `done` when it completes.
/// `done` keeps only the most recent completions. Segments evicted from it are still not
/// enqueued again while a listing places them before a segment that is in `done`.
#[derive(Debug)]
pub struct FetchState {
    pending: VecDeque<RangeUrl>,
    done: VecDeque<RangeUrl>,
    done_capacity: usize,
    in_flight: Option<RangeUrl>,
    init_segment_fetched: bool,
}

impl FetchState {
    pub fn new(done_capacity: usize) -> Self {
        Self {
            pending: VecDeque::new(),
            done: VecDeque::with_capacity(done_capacity),
            done_capacity: done_capacity.max(1),
            in_flight: None,
            init_segment_fetched: false,
        }
    }

    /// Appends every segment of `listing` not already pending or recently done, keeping
    /// playlist order. Returns how many were added.
    ///
    /// Playlist order is playback order, so everything listed before the most recently done
    /// segment of the listing has been played already and is skipped. A listing that shares
    /// no segment with `done` (a rewound manifest) is taken in full.
    pub fn enqueue(&mut self, listing: impl IntoIterator<Item = RangeUrl>) -> usize {
        let listing: Vec<RangeUrl> = listing.into_iter().collect();
        let resume_at = self
            .done
            .iter()
            .rev()
            .find_map(|done| listing.iter().position(|segment| segment == done))
            .map_or(0, |position| position + 1);

        let mut added = 0;
        for segment in listing.into_iter().skip(resume_at) {
            if self.pending.contains(&segment) || self.done.contains(&segment) {
                continue;
            }
            self.pending.push_back(segment);
            added += 1;
        }
        added
    }

    /// Claims the oldest pending segment. Returns `None` while another fetch is in flight.
    pub fn begin_next(&mut self) -> Option<RangeUrl> {
        if self.in_flight.is_some() {
            return None;
        }
        let next = self.pending.front().cloned()?;
        self.in_flight = Some(next.clone());
        Some(next)
    }

    /// Moves `segment` from pending to the done history, evicting the oldest entry when full.
    pub fn complete(&mut self, segment: &RangeUrl) {
        if self.in_flight.as_ref() == Some(segment) {
            self.in_flight = None;
        }
        self.pending.retain(|pending| pending != segment);

        if self.done.len() == self.done_capacity {
            self.done.pop_front();
        }
        self.done.push_back(segment.clone());
    }

    pub fn mark_init_segment_fetched(&mut self) {
        self.init_segment_fetched = true;
    }

    pub fn init_segment_fetched(&self) -> bool {
        self.init_segment_fetched
    }

    pub fn in_flight(&self) -> Option<&RangeUrl> {
        self.in_flight.as_ref()
    }

    pub fn pending(&self) -> impl Iterator<Item = &RangeUrl> {
        self.pending.iter()
    }

    pub fn done(&self) -> impl Iterator<Item = &RangeUrl> {
        self.done.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn segment(index: usize) -> RangeUrl {
        let url = Url::parse("http://example.com/media.mp4").unwrap();
        RangeUrl::with_range(url, Some(format!("{}-{}", index * 100, index * 100 + 99)))
    }

    #[test]
    fn enqueue_is_idempotent() {
        let mut state = FetchState::new(10);
        let segments: Vec<_> = (0..5).map(segment).collect();

        assert_eq!(state.enqueue(segments.clone()), 5);
        assert_eq!(state.enqueue(segments), 0);
        assert_eq!(state.pending().count(), 5);
    }

    #[test]
    fn same_url_different_range_is_a_different_segment() {
        let mut state = FetchState::new(10);
        let whole = RangeUrl::new(segment(0).url);
        assert_eq!(state.enqueue([segment(0), segment(1), whole]), 3);
    }

    #[test]
    fn single_flight() {
        let mut state = FetchState::new(10);
        state.enqueue([segment(0), segment(1)]);

        let first = state.begin_next().unwrap();
        assert_eq!(first, segment(0));
        assert_eq!(state.begin_next(), None);
        // Still pending while in flight, so a refresh cannot enqueue it twice.
        assert_eq!(state.enqueue([segment(0)]), 0);

        state.complete(&first);
        assert_eq!(state.in_flight(), None);
        assert_eq!(state.begin_next(), Some(segment(1)));
    }

    #[test]
    fn completing_removes_only_the_exact_segment() {
        let mut state = FetchState::new(10);
        state.enqueue([segment(0), segment(1)]);
        let first = state.begin_next().unwrap();
        state.complete(&first);
        assert_eq!(state.pending().cloned().collect::<Vec<_>>(), vec![segment(1)]);
    }

    #[test]
    fn done_history_keeps_most_recent() {
        let mut state = FetchState::new(10);
        state.enqueue((0..15).map(segment));
        while let Some(next) = state.begin_next() {
            state.complete(&next);
        }

        let done: Vec<_> = state.done().cloned().collect();
        assert_eq!(done, (5..15).map(segment).collect::<Vec<_>>());
        assert_eq!(state.pending().count(), 0);

        // Refreshing the same listing adds nothing, although 0..5 left the history.
        for _ in 0..3 {
            assert_eq!(state.enqueue((0..15).map(segment)), 0);
        }
        assert_eq!(state.pending().count(), 0);

        // Only what follows the last played segment is new.
        assert_eq!(state.enqueue((0..17).map(segment)), 2);
        assert_eq!(state.pending().cloned().collect::<Vec<_>>(), vec![segment(15), segment(16)]);
    }

    #[test]
    fn sliding_window_resumes_after_last_done() {
        let mut state = FetchState::new(3);
        state.enqueue((0..6).map(segment));
        while let Some(next) = state.begin_next() {
            state.complete(&next);
        }

        // Window moved on: 2 and 3 were played but only 3..6 remain in history.
        assert_eq!(state.enqueue((2..8).map(segment)), 2);
        assert_eq!(state.pending().cloned().collect::<Vec<_>>(), vec![segment(6), segment(7)]);
    }

    #[test]
    fn rewound_listing_is_taken_in_full() {
        let mut state = FetchState::new(10);
        state.enqueue((0..15).map(segment));
        while let Some(next) = state.begin_next() {
            state.complete(&next);
        }

        assert_eq!(state.enqueue((0..3).map(segment)), 3);
    }

    #[test]
    fn init_segment_flag() {
        let mut state = FetchState::new(10);
        assert!(!state.init_segment_fetched());
        state.mark_init_segment_fetched();
        assert!(state.init_segment_fetched());
    }
}
