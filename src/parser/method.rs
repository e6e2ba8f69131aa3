//! Method statement parsing
//!
//! A statement runs up to its full stop; the caller splits the method
//! paragraph and hands one statement at a time to [`method_statement`]. The
//! leading identifier selects the sub-grammar. Anything that is not a known
//! method keyword opens a verb loop.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::error::{label, SourceDiag, Stage};
use crate::lexer::T;
use crate::model::{MethodStep, MethodStepKind, Operand};
use crate::span::Span;

use super::block_parser::BlockParser;
use super::token_stream::Token;
use super::integer;

/// Loop verbs with an irregular past participle, plus the common regular
/// ones Chef recipes traditionally use. Unknown verbs fall back to the
/// regular inflection (drop a trailing `e`, append `ed`).
const VERB_PAIRS: &[(&str, &str)] = &[
    ("sift", "sifted"),
    ("rub", "rubbed"),
    ("melt", "melted"),
    ("caramelise", "caramelised"),
    ("cook", "cooked"),
    ("chop", "chopped"),
    ("bake", "baked"),
    ("roast", "roasted"),
    ("boil", "boiled"),
    ("chill", "chilled"),
    ("fry", "fried"),
    ("loop", "looped"),
    ("shake", "shaked"),
    ("sieve", "sieved"),
    ("squeeze", "squeezed"),
    ("drip", "dripped"),
    ("drop", "dropped"),
    ("scoop", "scooped"),
    ("coat", "coated"),
    ("randomize", "randomized"),
    ("toss", "tossed"),
    ("infuse", "infused"),
    ("watch", "watched"),
    ("smell", "smelled"),
    ("crush", "crushed"),
    ("mash", "mashed"),
    ("grind", "ground"),
    ("shuffle", "shuffled"),
    ("layer", "layered"),
    ("prepare", "prepared"),
    ("separate", "separated"),
    ("sprinkle", "sprinkled"),
    ("move", "moved"),
    ("recite", "recited"),
    ("repeat", "repeated"),
    ("siphon", "siphoned"),
    ("gulp", "gulped"),
    ("quote", "quoted"),
    ("part", "parted"),
    ("dissolve", "dissolved"),
    ("agitate", "agitated"),
    ("cool", "cooled"),
    ("leave", "left"),
    ("water", "watered"),
    ("heat", "heated"),
];

static KNOWN_VERBS: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| VERB_PAIRS.iter().copied().collect());

pub(crate) fn is_known_verb(lemma: &str) -> bool {
    KNOWN_VERBS.contains_key(lemma.to_lowercase().as_str())
}

/// The lowercase participle that closes a loop opened by `lemma`
pub(crate) fn expected_participle(lemma: &str) -> String {
    let mut lemma = lemma.to_lowercase();
    if let Some(participle) = KNOWN_VERBS.get(lemma.as_str()) {
        return (*participle).to_string();
    }
    if lemma.ends_with('e') {
        lemma.pop();
    }
    lemma.push_str("ed");
    lemma
}

/// The ordinal suffix the last digits of `n` call for
fn ordinal_suffix(n: u32) -> &'static str {
    match n % 100 {
        11..=13 => "th",
        _ => match n % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        },
    }
}

/// Warn when an amount and a singular/plural unit word disagree
pub(crate) fn check_unit_plurality(
    bp: &mut BlockParser,
    amount: i64,
    tok: Token,
    singular: &str,
    plural: &str,
) {
    let word = bp.token_str(tok).to_owned();
    let fix = if amount == 1 { singular } else { plural };
    if word != fix {
        bp.warn(
            SourceDiag::warning(
                format!("'{word}' does not match an amount of {amount}"),
                label!(tok.span),
                Stage::Parse,
            )
            .hint(format!("write '{fix}'")),
        );
    }
}

/// Parses an optional ordinal like `2nd`. `None` means no index present.
///
/// A wrong suffix for the number is a warning; a missing suffix or a zero
/// index is an error, recovered by keeping the number.
fn ordinal(bp: &mut BlockParser) -> Option<u32> {
    if !bp.at(T![int]) {
        return None;
    }
    let int_tok = bp.next_token().expect("peeked int");
    let n: u32 = match bp.token_str(int_tok).parse() {
        Ok(n) => n,
        Err(_) => {
            bp.error(SourceDiag::error(
                "ordinal index out of range",
                label!(int_tok.span),
                Stage::Parse,
            ));
            return Some(1);
        }
    };

    match bp.peek_raw() {
        Some(tok)
            if tok.kind == T![word]
                && tok.span.start() == int_tok.span.end()
                && matches!(bp.token_str(tok), "st" | "nd" | "rd" | "th") =>
        {
            let _ = bp.next_token();
            let suffix = ordinal_suffix(n);
            let written = bp.token_str(tok).to_owned();
            if written != suffix {
                bp.warn(
                    SourceDiag::warning(
                        format!("ordinal '{n}{written}' has the wrong suffix"),
                        label!(tok.span),
                        Stage::Parse,
                    )
                    .hint(format!("write '{n}{suffix}'")),
                );
            }
        }
        _ => {
            bp.error(SourceDiag::error(
                format!("expected an ordinal suffix after '{n}'"),
                label!(Span::pos(int_tok.span.end())),
                Stage::Parse,
            ));
        }
    }

    if n == 0 {
        bp.error(SourceDiag::error(
            "mixing bowls and baking dishes are numbered from 1",
            label!(int_tok.span),
            Stage::Parse,
        ));
        return Some(1);
    }
    Some(n)
}

fn expect_pair(bp: &mut BlockParser, first: &str, second: &str) -> Option<()> {
    if bp.consume_word(first).is_none() || bp.consume_word(second).is_none() {
        bp.error(SourceDiag::error(
            format!("expected '{first} {second}'"),
            label!(bp.current_span()),
            Stage::Parse,
        ));
        return None;
    }
    Some(())
}

/// `[the] [nth] mixing bowl`, defaulting to bowl 1
fn mixing_bowl(bp: &mut BlockParser) -> Option<u32> {
    let _ = bp.consume_word("the");
    let n = ordinal(bp).unwrap_or(1);
    expect_pair(bp, "mixing", "bowl")?;
    Some(n)
}

/// `[the] [nth] baking dish`, defaulting to dish 1
fn baking_dish(bp: &mut BlockParser) -> Option<u32> {
    let _ = bp.consume_word("the");
    let n = ordinal(bp).unwrap_or(1);
    expect_pair(bp, "baking", "dish")?;
    Some(n)
}

/// Ingredient name from a token slice, stripping an optional leading `the`
fn ingredient_operand(bp: &mut BlockParser, toks: &[Token]) -> Option<Operand> {
    let mut toks = trim_separators(toks);
    if let [first, rest @ ..] = toks {
        if first.kind == T![word] && bp.token_str(*first) == "the" && !trim_separators(rest).is_empty()
        {
            toks = trim_separators(rest);
        }
    }
    if toks.is_empty() {
        bp.error(SourceDiag::error(
            "expected an ingredient",
            label!(bp.current_span()),
            Stage::Parse,
        ));
        return None;
    }
    let span = Span::new(toks.first().unwrap().span.start(), toks.last().unwrap().span.end());
    Some(Operand::Ingredient {
        name: bp.slice_str(toks).trim().to_owned(),
        span,
    })
}

fn trim_separators(mut toks: &[Token]) -> &[Token] {
    while toks
        .first()
        .is_some_and(|t| matches!(t.kind, T![ws] | T![newline]))
    {
        toks = &toks[1..];
    }
    while toks
        .last()
        .is_some_and(|t| matches!(t.kind, T![ws] | T![newline]))
    {
        toks = &toks[..toks.len() - 1];
    }
    toks
}

fn nth_word<'i>(bp: &BlockParser<'_, 'i>, n: usize) -> Option<&'i str> {
    let tok = bp
        .rest()
        .iter()
        .filter(|t| !matches!(t.kind, T![ws] | T![newline]))
        .nth(n)?;
    (tok.kind == T![word]).then(|| bp.token_str(*tok))
}

/// Nothing may be left after a fully parsed statement
fn finish(bp: &mut BlockParser, step: MethodStep) -> Option<MethodStep> {
    if !bp.at_end() {
        let rest = bp.consume_rest();
        bp.error(SourceDiag::error(
            "unexpected trailing words in method statement",
            label!(bp.slice_span(rest)),
            Stage::Parse,
        ));
        return None;
    }
    Some(step)
}

/// Parses one method statement. The slice behind `bp` excludes the
/// terminating full stop; `span` covers the whole statement including it.
///
/// Scope resolution (loop begin/break/close) is the caller's job; this only
/// builds the step.
pub(crate) fn method_statement(bp: &mut BlockParser, span: Span) -> Option<MethodStep> {
    let kw_tok = match bp.peek_token() {
        Some(t) => t,
        None => return None,
    };
    if kw_tok.kind != T![word] {
        bp.error(SourceDiag::error(
            format!("expected a method keyword, found {}", kw_tok.kind),
            label!(kw_tok.span),
            Stage::Parse,
        ));
        return None;
    }
    let kw = bp.token_str(kw_tok).to_owned();
    let _ = bp.next_token();

    use MethodStepKind::*;
    match kw.as_str() {
        "Take" => take(bp, span),
        "Put" => ingredient_into_bowl(bp, span, Put, "into"),
        "Fold" => ingredient_into_bowl(bp, span, Fold, "into"),
        "Add" => add(bp, span),
        "Remove" => ingredient_into_bowl(bp, span, Remove, "from"),
        "Combine" => ingredient_into_bowl(bp, span, Combine, "into"),
        "Divide" => ingredient_into_bowl(bp, span, Divide, "into"),
        "Liquefy" | "Liquify" => liquefy(bp, span),
        "Stir" => stir(bp, span),
        "Mix" => mix(bp, span),
        "Clean" => clean(bp, span),
        "Pour" => pour(bp, span),
        "Set" => set_aside(bp, span),
        "Serve" => serve(bp, span),
        "Refrigerate" => refrigerate(bp, span),
        "Until" => until_verbed(bp, span),
        _ => verb_begin(bp, span, kw, kw_tok),
    }
}

/// `Take ingredient from [the] refrigerator`
fn take(bp: &mut BlockParser, span: Span) -> Option<MethodStep> {
    let name_toks = match bp.until_last_word("from") {
        Some(toks) => toks,
        None => {
            bp.error(SourceDiag::error(
                "expected 'from refrigerator'",
                label!(bp.current_span()),
                Stage::Parse,
            ));
            return None;
        }
    };
    let _ = bp.consume_word("from");
    let _ = bp.consume_word("the");
    if bp.consume_word("refrigerator").is_none() {
        bp.error(SourceDiag::error(
            "expected 'refrigerator'",
            label!(bp.current_span()),
            Stage::Parse,
        ));
        return None;
    }
    let ingredient = ingredient_operand(bp, name_toks)?;
    finish(
        bp,
        MethodStep::with_operands(MethodStepKind::Take, span, [ingredient]),
    )
}

/// Shared shape of `Put`, `Fold`, `Add`, `Remove`, `Combine` and `Divide`:
/// `ingredient <prep> [the] [nth] mixing bowl`
fn ingredient_into_bowl(
    bp: &mut BlockParser,
    span: Span,
    kind: MethodStepKind,
    prep: &str,
) -> Option<MethodStep> {
    let name_toks = match bp.until_last_word(prep) {
        Some(toks) => toks,
        None => {
            bp.error(SourceDiag::error(
                format!("expected '{prep}' followed by a mixing bowl"),
                label!(bp.current_span()),
                Stage::Parse,
            ));
            return None;
        }
    };
    let _ = bp.consume_word(prep);
    let bowl = mixing_bowl(bp)?;
    let ingredient = ingredient_operand(bp, name_toks)?;
    finish(
        bp,
        MethodStep::with_operands(kind, span, [ingredient, Operand::MixingBowl(bowl)]),
    )
}

/// `Add dry ingredients [to [the] [nth] mixing bowl]`, or a plain `Add`
fn add(bp: &mut BlockParser, span: Span) -> Option<MethodStep> {
    let dry = bp
        .with_recover(|bp| {
            bp.consume_word("dry")?;
            bp.consume_word("ingredients")?;
            Some(())
        })
        .is_some();
    if !dry {
        return ingredient_into_bowl(bp, span, MethodStepKind::Add, "to");
    }

    let bowl = if bp.at_end() {
        1
    } else {
        if bp.consume_word("to").is_none() {
            bp.error(SourceDiag::error(
                "expected 'to' after 'Add dry ingredients'",
                label!(bp.current_span()),
                Stage::Parse,
            ));
            return None;
        }
        mixing_bowl(bp)?
    };
    finish(
        bp,
        MethodStep::with_operands(MethodStepKind::AddDry, span, [Operand::MixingBowl(bowl)]),
    )
}

/// `Liquefy contents of [the] [nth] mixing bowl` or `Liquefy ingredient`
fn liquefy(bp: &mut BlockParser, span: Span) -> Option<MethodStep> {
    let bowl_form = nth_word(bp, 0) == Some("contents")
        || (nth_word(bp, 0) == Some("the") && nth_word(bp, 1) == Some("contents"));
    if bowl_form {
        let _ = bp.consume_word("the");
        let _ = bp.consume_word("contents");
        if bp.consume_word("of").is_none() {
            bp.error(SourceDiag::error(
                "expected 'of' after 'contents'",
                label!(bp.current_span()),
                Stage::Parse,
            ));
            return None;
        }
        let bowl = mixing_bowl(bp)?;
        finish(
            bp,
            MethodStep::with_operands(
                MethodStepKind::LiquefyBowl,
                span,
                [Operand::MixingBowl(bowl)],
            ),
        )
    } else {
        let toks = bp.consume_rest();
        let ingredient = ingredient_operand(bp, toks)?;
        Some(MethodStep::with_operands(
            MethodStepKind::LiquefyIngredient,
            span,
            [ingredient],
        ))
    }
}

/// `Stir [[the] [nth] mixing bowl] for n minutes`
/// or `Stir ingredient into [the] [nth] mixing bowl`
fn stir(bp: &mut BlockParser, span: Span) -> Option<MethodStep> {
    if bp.contains_word("into") {
        let name_toks = bp.until_last_word("into").expect("checked above");
        let _ = bp.consume_word("into");
        let bowl = mixing_bowl(bp)?;
        let ingredient = ingredient_operand(bp, name_toks)?;
        return finish(
            bp,
            MethodStep::with_operands(
                MethodStepKind::StirIngredient,
                span,
                [ingredient, Operand::MixingBowl(bowl)],
            ),
        );
    }

    let bowl = if bp.at_word("for") { 1 } else { mixing_bowl(bp)? };
    if bp.consume_word("for").is_none() {
        bp.error(SourceDiag::error(
            "expected 'for'",
            label!(bp.current_span()),
            Stage::Parse,
        ));
        return None;
    }
    let minutes = integer(bp)?;
    match bp.peek_token() {
        Some(tok) if bp.at_any_word(&["minute", "minutes"]) => {
            let _ = bp.next_token();
            check_unit_plurality(bp, *minutes.value(), tok, "minute", "minutes");
        }
        _ => {
            bp.error(SourceDiag::error(
                "expected 'minutes'",
                label!(bp.current_span()),
                Stage::Parse,
            ));
            return None;
        }
    }
    finish(
        bp,
        MethodStep::with_operands(
            MethodStepKind::StirBowl,
            span,
            [
                Operand::MixingBowl(bowl),
                Operand::Number(minutes.into_inner()),
            ],
        ),
    )
}

/// `Mix [[the] [nth] mixing bowl] well`
fn mix(bp: &mut BlockParser, span: Span) -> Option<MethodStep> {
    let bowl = if bp.at_word("well") { 1 } else { mixing_bowl(bp)? };
    if bp.consume_word("well").is_none() {
        bp.error(SourceDiag::error(
            "expected 'well'",
            label!(bp.current_span()),
            Stage::Parse,
        ));
        return None;
    }
    finish(
        bp,
        MethodStep::with_operands(MethodStepKind::Mix, span, [Operand::MixingBowl(bowl)]),
    )
}

/// `Clean [the] [nth] mixing bowl`
fn clean(bp: &mut BlockParser, span: Span) -> Option<MethodStep> {
    let bowl = mixing_bowl(bp)?;
    finish(
        bp,
        MethodStep::with_operands(MethodStepKind::Clean, span, [Operand::MixingBowl(bowl)]),
    )
}

/// `Pour contents of [the] [nth] mixing bowl into the [nth] baking dish`
fn pour(bp: &mut BlockParser, span: Span) -> Option<MethodStep> {
    let _ = bp.consume_word("the");
    expect_pair(bp, "contents", "of")?;
    let bowl = mixing_bowl(bp)?;
    if bp.consume_word("into").is_none() {
        bp.error(SourceDiag::error(
            "expected 'into the'",
            label!(bp.current_span()),
            Stage::Parse,
        ));
        return None;
    }
    let _ = bp.consume_word("the");
    let dish = baking_dish(bp)?;
    finish(
        bp,
        MethodStep::with_operands(
            MethodStepKind::Pour,
            span,
            [Operand::MixingBowl(bowl), Operand::BakingDish(dish)],
        ),
    )
}

/// `Set aside`
fn set_aside(bp: &mut BlockParser, span: Span) -> Option<MethodStep> {
    if bp.consume_word("aside").is_none() {
        bp.error(SourceDiag::error(
            "expected 'aside' after 'Set'",
            label!(bp.current_span()),
            Stage::Parse,
        ));
        return None;
    }
    finish(bp, MethodStep::new(MethodStepKind::SetAside, span))
}

/// `Serve with recipe title`
fn serve(bp: &mut BlockParser, span: Span) -> Option<MethodStep> {
    if bp.consume_word("with").is_none() {
        bp.error(SourceDiag::error(
            "expected 'with' after 'Serve'",
            label!(bp.current_span()),
            Stage::Parse,
        ));
        return None;
    }
    let toks = trim_separators(bp.consume_rest());
    let title = bp.slice_str(toks).trim();
    if title.is_empty() {
        bp.error(SourceDiag::error(
            "expected a recipe title after 'Serve with'",
            label!(bp.current_span()),
            Stage::Parse,
        ));
        return None;
    }
    let title_span = Span::new(toks.first().unwrap().span.start(), toks.last().unwrap().span.end());
    Some(MethodStep::with_operands(
        MethodStepKind::Serve,
        span,
        [Operand::Recipe {
            title: title.to_owned(),
            span: title_span,
        }],
    ))
}

/// `Refrigerate [for n hours]`
fn refrigerate(bp: &mut BlockParser, span: Span) -> Option<MethodStep> {
    if bp.at_end() {
        return Some(MethodStep::new(MethodStepKind::Refrigerate, span));
    }
    if bp.consume_word("for").is_none() {
        bp.error(SourceDiag::error(
            "expected 'for' after 'Refrigerate'",
            label!(bp.current_span()),
            Stage::Parse,
        ));
        return None;
    }
    let hours = integer(bp)?;
    match bp.peek_token() {
        Some(tok) if bp.at_any_word(&["hour", "hours"]) => {
            let _ = bp.next_token();
            check_unit_plurality(bp, *hours.value(), tok, "hour", "hours");
        }
        _ => {
            bp.error(SourceDiag::error(
                "expected 'hours'",
                label!(bp.current_span()),
                Stage::Parse,
            ));
            return None;
        }
    }
    finish(
        bp,
        MethodStep::with_operands(
            MethodStepKind::Refrigerate,
            span,
            [Operand::Number(hours.into_inner())],
        ),
    )
}

/// `Until pastParticiple [ingredient]`
fn until_verbed(bp: &mut BlockParser, span: Span) -> Option<MethodStep> {
    let participle_tok = match bp.consume(T![word]) {
        Some(t) => t,
        None => {
            bp.error(SourceDiag::error(
                "expected a past participle after 'Until'",
                label!(bp.current_span()),
                Stage::Parse,
            ));
            return None;
        }
    };
    let participle = bp.token_str(participle_tok).to_owned();

    let mut step = MethodStep::with_operands(
        MethodStepKind::UntilVerbed,
        span,
        [Operand::Verb(participle)],
    );
    let rest = trim_separators(bp.consume_rest());
    if !rest.is_empty() {
        step.operands.push(ingredient_operand(bp, rest)?);
    }
    Some(step)
}

/// Any other leading identifier opens a verb loop: `verb ingredient`
fn verb_begin(bp: &mut BlockParser, span: Span, verb: String, verb_tok: Token) -> Option<MethodStep> {
    if !is_known_verb(&verb) {
        bp.warn(
            SourceDiag::warning(
                format!("unknown method keyword '{verb}'"),
                label!(verb_tok.span),
                Stage::Parse,
            )
            .hint(format!(
                "assuming a loop statement closed by 'Until {}'",
                expected_participle(&verb)
            )),
        );
    }
    let toks = bp.consume_rest();
    let ingredient = ingredient_operand(bp, toks)?;
    Some(MethodStep::with_operands(
        MethodStepKind::VerbBegin,
        span,
        [Operand::Verb(verb), ingredient],
    ))
}
