//! Parser for the compact schedule strings found in the catalog,
//! e.g. `월1,2,3(공학관 101)<p>수4~5(공학관 101)`.
//!
//! ```text
//! schedule ::= segment ( "<p>" segment )*
//! segment  ::= ws* block ( ws* block )*
//! block    ::= day ws* periods ws* room?
//! day      ::= "월" | "화" | "수" | "목" | "금"
//! periods  ::= item ( "," ws* item )*
//! item     ::= int ( ( "~" | "-" ) int )?
//! room     ::= "(" balanced-text ")" | text up to the next `day ws* digit` pair
//! ```
//!
//! Anything that does not fit is skipped up to the next block. Nothing here fails:
//! a schedule that cannot be read simply occupies no periods.
use std::collections::BTreeSet;

use super::models::Day;

const SEGMENT_SEPARATOR: &str = "<p>";

/// One contiguous block of periods on one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotSpec {
    pub day: Day,
    pub range: Vec<u8>,
    pub room: Option<String>,
}

pub fn parse_schedule(raw: &str) -> Vec<SlotSpec> {
    split_segments(raw)
        .into_iter()
        .flat_map(parse_segment)
        .collect()
}

/* `<p>` is matched case-insensitively; ASCII lowering keeps byte offsets intact */
fn split_segments(raw: &str) -> Vec<&str> {
    let lowered = raw.to_ascii_lowercase();
    let mut segments = Vec::new();
    let mut start = 0;
    for (pos, _) in lowered.match_indices(SEGMENT_SEPARATOR) {
        segments.push(&raw[start..pos]);
        start = pos + SEGMENT_SEPARATOR.len();
    }
    segments.push(&raw[start..]);
    segments
}

fn parse_segment(segment: &str) -> Vec<SlotSpec> {
    let mut cursor = Cursor::new(segment);
    let mut slots = Vec::new();

    loop {
        cursor.skip_ws();
        let Some(token) = cursor.bump() else {
            break;
        };
        let Some(day) = Day::from_token(token) else {
            cursor.take_until_block();
            continue;
        };

        cursor.skip_ws();
        let periods = cursor.periods();
        let room = cursor.room();
        if let Some(periods) = periods {
            slots.extend(contiguous_runs(&periods).into_iter().map(|range| SlotSpec {
                day,
                range,
                room: room.clone(),
            }));
        }
    }

    slots
}

fn contiguous_runs(periods: &BTreeSet<u8>) -> Vec<Vec<u8>> {
    let mut runs: Vec<Vec<u8>> = Vec::new();
    for &period in periods {
        match runs.last_mut() {
            Some(run) if run.last().and_then(|last| last.checked_add(1)) == Some(period) => {
                run.push(period)
            }
            _ => runs.push(vec![period]),
        }
    }
    runs
}

struct Cursor<'a> {
    rest: &'a str,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self { rest: input }
    }

    fn peek(&self) -> Option<char> {
        self.rest.chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.rest = &self.rest[c.len_utf8()..];
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        self.rest = self.rest.trim_start();
    }

    /// Digits as a period number; `None` when there are none or they overflow.
    fn number(&mut self) -> Option<u8> {
        let len = self
            .rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(self.rest.len());
        let (digits, rest) = self.rest.split_at(len);
        self.rest = rest;
        if digits.is_empty() {
            return None;
        }
        digits.parse().ok()
    }

    /// Every period named by the block, or `None` if any item is unreadable.
    fn periods(&mut self) -> Option<BTreeSet<u8>> {
        let mut periods = BTreeSet::new();
        loop {
            let start = self.number()?;
            let end = if self.eat('~') || self.eat('-') {
                self.number()?
            } else {
                start
            };
            if start == 0 || start > end {
                return None;
            }
            periods.extend(start..=end);

            self.skip_ws();
            if !self.eat(',') {
                break;
            }
            self.skip_ws();
        }
        Some(periods)
    }

    fn room(&mut self) -> Option<String> {
        self.skip_ws();
        let text = if self.eat('(') {
            self.balanced()
        } else {
            self.take_until_block()
        };
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_owned())
    }

    /// Text up to the parenthesis closing an already consumed `(`.
    fn balanced(&mut self) -> &'a str {
        let mut depth = 1usize;
        for (pos, c) in self.rest.char_indices() {
            match c {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        let inner = &self.rest[..pos];
                        self.rest = &self.rest[pos + 1..];
                        return inner;
                    }
                }
                _ => {}
            }
        }
        std::mem::take(&mut self.rest)
    }

    /// Text up to the next day token followed, after optional whitespace, by a digit.
    fn take_until_block(&mut self) -> &'a str {
        for (pos, c) in self.rest.char_indices() {
            let after = &self.rest[pos + c.len_utf8()..];
            let starts_block = Day::from_token(c).is_some()
                && after
                    .trim_start()
                    .starts_with(|next: char| next.is_ascii_digit());
            if starts_block {
                let taken = &self.rest[..pos];
                self.rest = &self.rest[pos..];
                return taken;
            }
        }
        std::mem::take(&mut self.rest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(day: Day, range: &[u8], room: Option<&str>) -> SlotSpec {
        SlotSpec {
            day,
            range: range.to_vec(),
            room: room.map(str::to_owned),
        }
    }

    #[test]
    fn parse_empty_and_dayless_strings() {
        assert!(parse_schedule("").is_empty());
        assert!(parse_schedule("   ").is_empty());
        assert!(parse_schedule("1,2,3(공학관)").is_empty());
        assert!(parse_schedule("TBA").is_empty());
    }

    #[test]
    fn parse_comma_list_and_range_agree() {
        let listed = parse_schedule("월2,3,4(A101)");
        let ranged = parse_schedule("월2~4(A101)");
        let dashed = parse_schedule("월2-4(A101)");
        assert_eq!(listed, vec![spec(Day::Mon, &[2, 3, 4], Some("A101"))]);
        assert_eq!(listed, ranged);
        assert_eq!(listed, dashed);
    }

    #[test]
    fn parse_multiple_segments() {
        let slots = parse_schedule("월1,2(7-411)<p>수3~4(7-411)<P>금 5");
        assert_eq!(
            slots,
            vec![
                spec(Day::Mon, &[1, 2], Some("7-411")),
                spec(Day::Wed, &[3, 4], Some("7-411")),
                spec(Day::Fri, &[5], None),
            ]
        );
    }

    #[test]
    fn parse_blocks_without_separator() {
        let slots = parse_schedule("화1,2(본관 301)목3,4(본관 301)");
        assert_eq!(
            slots,
            vec![
                spec(Day::Tue, &[1, 2], Some("본관 301")),
                spec(Day::Thu, &[3, 4], Some("본관 301")),
            ]
        );
    }

    #[test]
    fn parse_bare_room_stops_at_next_block() {
        let slots = parse_schedule("월1,2 월드관 101화3");
        assert_eq!(
            slots,
            vec![
                spec(Day::Mon, &[1, 2], Some("월드관 101")),
                spec(Day::Tue, &[3], None),
            ]
        );
    }

    #[test]
    fn parse_spaced_block_after_bare_room() {
        assert_eq!(
            parse_schedule("월1,2 화 3"),
            vec![spec(Day::Mon, &[1, 2], None), spec(Day::Tue, &[3], None)]
        );
        assert_eq!(
            parse_schedule("월1,2 공학관 화 3,4(B)"),
            vec![
                spec(Day::Mon, &[1, 2], Some("공학관")),
                spec(Day::Tue, &[3, 4], Some("B")),
            ]
        );
    }

    #[test]
    fn parse_splits_gaps_into_separate_slots() {
        let slots = parse_schedule("목1,2,5,6(B)");
        assert_eq!(
            slots,
            vec![
                spec(Day::Thu, &[1, 2], Some("B")),
                spec(Day::Thu, &[5, 6], Some("B")),
            ]
        );
    }

    #[test]
    fn parse_skips_unreadable_blocks_only() {
        let slots = parse_schedule("토1,2(A)<p>월x(B)<p>화0(C)<p>수4~2(D)<p>목999(E)<p>금7(F)");
        assert_eq!(slots, vec![spec(Day::Fri, &[7], Some("F"))]);
    }

    #[test]
    fn parse_nested_parentheses_in_room() {
        let slots = parse_schedule("수6,7(체육관(지하))");
        assert_eq!(slots, vec![spec(Day::Wed, &[6, 7], Some("체육관(지하)"))]);
    }

    #[test]
    fn parsed_ranges_are_contiguous() {
        let inputs = [
            "월1,3,4,5,9(A)",
            "화2~4,6~7",
            "수1<p>수2<p>목10-12(X)목14",
            "금 3 , 4 , 8",
        ];
        for input in inputs {
            for slot in parse_schedule(input) {
                assert!(!slot.range.is_empty(), "{input}");
                assert!(
                    slot.range.windows(2).all(|pair| pair[1] == pair[0] + 1),
                    "{input}: {:?}",
                    slot.range
                );
                assert!(Day::ALL.contains(&slot.day));
            }
        }
    }
}
