//! Ingredient list parsing
//!
//! One ingredient per line: `[ integer ] [ measure_type ] [ measure ] name`.
//! The measure decides the initial value tag of the ingredient.

use crate::error::{label, SourceDiag, Stage};
use crate::model::{Ingredient, ValueTag};

use super::block_parser::BlockParser;
use super::opt_integer;

/// `heaped`/`level` force a dry measure
const MEASURE_TYPES: &[&str] = &["heaped", "level"];

const DRY_MEASURES: &[&str] = &["g", "kg", "pinch", "pinches"];
const WET_MEASURES: &[&str] = &["ml", "l", "dash", "dashes"];
const UNSPECIFIED_MEASURES: &[&str] = &[
    "cup",
    "cups",
    "teaspoon",
    "teaspoons",
    "tablespoon",
    "tablespoons",
];

/// Singular/plural forms of the measures that inflect
const MEASURE_PLURALS: &[(&str, &str)] = &[
    ("pinch", "pinches"),
    ("dash", "dashes"),
    ("cup", "cups"),
    ("teaspoon", "teaspoons"),
    ("tablespoon", "tablespoons"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MeasureKind {
    Dry,
    Wet,
    Unspecified,
}

fn measure_kind(word: &str) -> Option<MeasureKind> {
    if DRY_MEASURES.contains(&word) {
        Some(MeasureKind::Dry)
    } else if WET_MEASURES.contains(&word) {
        Some(MeasureKind::Wet)
    } else if UNSPECIFIED_MEASURES.contains(&word) {
        Some(MeasureKind::Unspecified)
    } else {
        None
    }
}

/// Warn when a measure's grammatical number does not match the amount. An
/// absent amount counts as 1. Measures like `g` or `ml` never mismatch.
pub(crate) fn check_plurality(bp: &mut BlockParser, amount: i64, word: &str, span: crate::span::Span) {
    let (wants_singular, pair) = match MEASURE_PLURALS
        .iter()
        .find(|(s, p)| *s == word || *p == word)
    {
        Some(pair) => (word == pair.0, *pair),
        None => return,
    };
    if (amount == 1) != wants_singular {
        let fix = if amount == 1 { pair.0 } else { pair.1 };
        bp.warn(
            SourceDiag::warning(
                format!("'{word}' does not match an amount of {amount}"),
                label!(span),
                Stage::Parse,
            )
            .hint(format!("write '{fix}'")),
        );
    }
}

/// Parses a single ingredient line. `None` means the line was invalid and a
/// diagnostic has been emitted.
pub(crate) fn ingredient_line(bp: &mut BlockParser) -> Option<Ingredient> {
    let line_span = bp.slice_span(bp.rest());

    let initial_value = opt_integer(bp);

    let mut tag = ValueTag::Dry;
    let mut measure_type = None;
    if bp.at_any_word(MEASURE_TYPES) {
        measure_type = bp.next_token();
    }

    let mut measure = None;
    if let Some(tok) = bp.peek_token() {
        if let Some(kind) = measure_kind(bp.token_str(tok)) {
            measure = Some((tok, kind));
            let _ = bp.next_token();
            match kind {
                MeasureKind::Dry => tag = ValueTag::Dry,
                MeasureKind::Wet => {
                    if let Some(mt) = measure_type {
                        bp.error(
                            SourceDiag::error(
                                format!(
                                    "wet measure '{}' after '{}'",
                                    bp.token_str(tok),
                                    bp.token_str(mt),
                                ),
                                label!(tok.span),
                                Stage::Parse,
                            )
                            .hint("'heaped' and 'level' only apply to dry measures"),
                        );
                        return None;
                    }
                    tag = ValueTag::Liquid;
                }
                MeasureKind::Unspecified => {}
            }
        }
    }

    if measure_type.is_some() && measure.is_none() {
        let tok = measure_type.unwrap();
        bp.error(
            SourceDiag::error(
                format!("'{}' without a following measure", bp.token_str(tok)),
                label!(tok.span),
                Stage::Parse,
            ),
        );
        return None;
    }

    if let Some((tok, _)) = measure {
        let amount = initial_value.map(|v| v.into_inner()).unwrap_or(1);
        let word = bp.token_str(tok).to_owned();
        check_plurality(bp, amount, &word, tok.span);
    }

    let name_toks = bp.consume_rest();
    let name = bp.slice_str(name_toks).trim();
    if name.is_empty() {
        bp.error(SourceDiag::error(
            "missing ingredient name",
            label!(bp.current_span()),
            Stage::Parse,
        ));
        return None;
    }

    Some(Ingredient {
        name: name.to_owned(),
        initial_value: initial_value.map(|v| v.into_inner()),
        initial_tag: tag,
        declared: line_span,
    })
}
