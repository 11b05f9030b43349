use crate::model::{Calendar, Span};

// ── Free-span computation ─────────────────────────────────────────

/// Free spans of a room within `query`: the window minus the merged
/// active calendar slots that overlap it.
pub fn free_spans(calendar: &Calendar, query: &Span) -> Vec<Span> {
    let mut busy: Vec<Span> = calendar
        .overlapping(query)
        .map(|s| Span::new(s.span.start.max(query.start), s.span.end.min(query.end)))
        .collect();
    busy.sort_by_key(|s| s.start);
    let busy = merge_overlapping(&busy);
    subtract_intervals(&[*query], &busy)
}

/// Merge sorted overlapping/adjacent intervals into disjoint intervals.
pub fn merge_overlapping(sorted: &[Span]) -> Vec<Span> {
    let mut merged: Vec<Span> = Vec::new();
    for &span in sorted {
        if let Some(last) = merged.last_mut()
            && span.start <= last.end {
                last.end = last.end.max(span.end);
                continue;
            }
        merged.push(span);
    }
    merged
}

pub fn subtract_intervals(base: &[Span], to_remove: &[Span]) -> Vec<Span> {
    let mut result = Vec::new();
    let mut ri = 0;

    for &b in base {
        let mut current_start = b.start;
        let current_end = b.end;

        while ri < to_remove.len() && to_remove[ri].end <= current_start {
            ri += 1;
        }

        let mut j = ri;
        while j < to_remove.len() && to_remove[j].start < current_end {
            let r = &to_remove[j];
            if r.start > current_start {
                result.push(Span::new(current_start, r.start));
            }
            current_start = current_start.max(r.end);
            j += 1;
        }

        if current_start < current_end {
            result.push(Span::new(current_start, current_end));
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use ulid::Ulid;

    // ── subtract_intervals ────────────────────────────────

    #[test]
    fn subtract_no_overlap() {
        let base = vec![Span::new(100, 200), Span::new(300, 400)];
        let remove = vec![Span::new(200, 300)];
        let result = subtract_intervals(&base, &remove);
        assert_eq!(result, base);
    }

    #[test]
    fn subtract_full_overlap() {
        let base = vec![Span::new(100, 200)];
        let remove = vec![Span::new(50, 250)];
        let result = subtract_intervals(&base, &remove);
        assert!(result.is_empty());
    }

    #[test]
    fn subtract_partial_left() {
        let base = vec![Span::new(100, 200)];
        let remove = vec![Span::new(50, 150)];
        let result = subtract_intervals(&base, &remove);
        assert_eq!(result, vec![Span::new(150, 200)]);
    }

    #[test]
    fn subtract_partial_right() {
        let base = vec![Span::new(100, 200)];
        let remove = vec![Span::new(150, 250)];
        let result = subtract_intervals(&base, &remove);
        assert_eq!(result, vec![Span::new(100, 150)]);
    }

    #[test]
    fn subtract_middle_punch() {
        let base = vec![Span::new(100, 300)];
        let remove = vec![Span::new(150, 200)];
        let result = subtract_intervals(&base, &remove);
        assert_eq!(result, vec![Span::new(100, 150), Span::new(200, 300)]);
    }

    #[test]
    fn subtract_multiple_punches() {
        let base = vec![Span::new(0, 1000)];
        let remove = vec![
            Span::new(100, 200),
            Span::new(400, 500),
            Span::new(800, 900),
        ];
        let result = subtract_intervals(&base, &remove);
        assert_eq!(
            result,
            vec![
                Span::new(0, 100),
                Span::new(200, 400),
                Span::new(500, 800),
                Span::new(900, 1000),
            ]
        );
    }

    #[test]
    fn subtract_empty_removals() {
        let base = vec![Span::new(100, 200)];
        let result = subtract_intervals(&base, &[]);
        assert_eq!(result, base);
    }

    // ── merge_overlapping ────────────────────────────────

    #[test]
    fn merge_overlapping_basic() {
        let spans = vec![
            Span::new(100, 300),
            Span::new(200, 400),
            Span::new(500, 600),
        ];
        let merged = merge_overlapping(&spans);
        assert_eq!(merged, vec![Span::new(100, 400), Span::new(500, 600)]);
    }

    #[test]
    fn merge_overlapping_adjacent() {
        let spans = vec![Span::new(100, 200), Span::new(200, 300)];
        let merged = merge_overlapping(&spans);
        assert_eq!(merged, vec![Span::new(100, 300)]);
    }

    #[test]
    fn merge_empty() {
        assert!(merge_overlapping(&[]).is_empty());
    }

    // ── free_spans ───────────────────────────────────────

    #[test]
    fn free_spans_empty_calendar() {
        let cal = Calendar::new();
        let free = free_spans(&cal, &Span::new(0, 1000));
        assert_eq!(free, vec![Span::new(0, 1000)]);
    }

    #[test]
    fn free_spans_fragments_around_bookings() {
        let mut cal = Calendar::new();
        cal.insert(Ulid::new(), Span::new(100, 200));
        cal.insert(Ulid::new(), Span::new(400, 500));
        let free = free_spans(&cal, &Span::new(0, 1000));
        assert_eq!(
            free,
            vec![Span::new(0, 100), Span::new(200, 400), Span::new(500, 1000)]
        );
    }

    #[test]
    fn free_spans_clamps_to_window() {
        let mut cal = Calendar::new();
        // Booking starts before and ends inside the window
        cal.insert(Ulid::new(), Span::new(0, 300));
        let free = free_spans(&cal, &Span::new(200, 600));
        assert_eq!(free, vec![Span::new(300, 600)]);
    }

    #[test]
    fn free_spans_fully_booked() {
        let mut cal = Calendar::new();
        cal.insert(Ulid::new(), Span::new(0, 1000));
        let free = free_spans(&cal, &Span::new(100, 900));
        assert!(free.is_empty());
    }
}
