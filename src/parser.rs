use crate::database::model::{Choice, OptionSet};

/// Parses a four-line options block of the form:
///
/// ```text
/// a) Tashkent
/// b) Samarkand
/// c) (Bukhara)
/// d) Khiva
/// ```
///
/// Each of the first four non-blank lines must start with `<letter>)`
/// (letter case-insensitive). A line whose remainder contains both `(` and
/// `)` marks the correct option; all parenthesis characters are stripped
/// from its stored text. If several lines carry the markup, the last one
/// wins without complaint.
pub fn parse_options_block(text: &str) -> Option<(OptionSet, Choice)> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    if lines.len() < 4 {
        return None;
    }

    let mut options: [Option<String>; 4] = Default::default();
    let mut correct = None;

    for line in &lines[..4] {
        let mut chars = line.chars();
        let key = Choice::from_letter(chars.next()?)?;
        if chars.next() != Some(')') {
            return None;
        }
        let rest = line[2..].trim();

        if rest.contains('(') && rest.contains(')') {
            let stripped: String = rest.chars().filter(|c| !matches!(c, '(' | ')')).collect();
            options[key as usize] = Some(stripped.trim().to_owned());
            correct = Some(key);
        } else {
            options[key as usize] = Some(rest.to_owned());
        }
    }

    let [a, b, c, d] = options;
    let options = OptionSet {
        a: a?,
        b: b?,
        c: c?,
        d: d?,
    };
    Some((options, correct?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_block_with_one_marked_line() {
        let (options, correct) =
            parse_options_block("a) 12\nb) 25\nc) (29)\nd) 31").expect("should parse");
        assert_eq!(correct, Choice::C);
        assert_eq!(options.a, "12");
        assert_eq!(options.b, "25");
        assert_eq!(options.c, "29");
        assert_eq!(options.d, "31");
    }

    #[test]
    fn trims_lines_and_skips_blank_ones() {
        let text = "\n  a) one \n\n b) two\nc) three\n  d) (four)  \n";
        let (options, correct) = parse_options_block(text).expect("should parse");
        assert_eq!(correct, Choice::D);
        assert_eq!(options.a, "one");
        assert_eq!(options.d, "four");
    }

    #[test]
    fn keys_are_case_insensitive() {
        let (options, correct) =
            parse_options_block("A) x\nB) y\nC) z\nD) (w)").expect("should parse");
        assert_eq!(correct, Choice::D);
        assert_eq!(options.a, "x");
    }

    #[test]
    fn strips_every_parenthesis_from_the_marked_text() {
        let (options, correct) =
            parse_options_block("a) x\nb) (one) two (three)\nc) z\nd) w").expect("should parse");
        assert_eq!(correct, Choice::B);
        assert_eq!(options.b, "one two three");
    }

    #[test]
    fn later_marked_line_silently_overrides_an_earlier_one() {
        let (options, correct) =
            parse_options_block("a) (first)\nb) y\nc) (second)\nd) w").expect("should parse");
        assert_eq!(correct, Choice::C);
        // Both marked lines still get their parentheses stripped.
        assert_eq!(options.a, "first");
        assert_eq!(options.c, "second");
    }

    #[test]
    fn fails_with_fewer_than_four_lines() {
        assert!(parse_options_block("a) x\nb) y\nc) (z)").is_none());
        assert!(parse_options_block("").is_none());
    }

    #[test]
    fn fails_on_a_bad_prefix() {
        assert!(parse_options_block("a) x\nb y\nc) (z)\nd) w").is_none());
        assert!(parse_options_block("a) x\n-\nc) (z)\nd) w").is_none());
    }

    #[test]
    fn fails_when_keys_are_not_exactly_a_through_d() {
        assert!(parse_options_block("a) x\nb) y\nc) (z)\ne) w").is_none());
        assert!(parse_options_block("a) x\na) y\nc) (z)\nd) w").is_none());
    }

    #[test]
    fn fails_without_a_marked_correct_line() {
        assert!(parse_options_block("a) x\nb) y\nc) z\nd) w").is_none());
    }

    #[test]
    fn lines_past_the_fourth_are_ignored() {
        let (_, correct) =
            parse_options_block("a) x\nb) (y)\nc) z\nd) w\ne) ignored\n(extra)").expect("parses");
        assert_eq!(correct, Choice::B);
    }
}
