//! Chef parser
//!
//! Grammar:
//! ```txt
//! program     = recipe (EOP recipe)* Eof
//! recipe      = title EOP
//!               [comment EOP]
//!               "Ingredients." Newline ingredient_line* EOP
//!               [cooking_time EOP]
//!               [oven_temperature EOP]
//!               "Method." Newline statement* EOP
//!               [serves]
//!
//! title       = (!FullStop ANY)+ FullStop
//! comment     = { any paragraph not starting with "Ingredients." }
//!
//! ingredient_line  = [Int] [measure_type] [measure] name Newline
//! measure_type     = "heaped" | "level"
//! measure          = dry | wet | unspecified
//!
//! cooking_time     = "Cooking time" Colon Int time_unit FullStop
//! oven_temperature = "Pre" Hyphen "heat oven to" Int "degrees Celcius"
//!                    [OpenParen "gas mark" Int CloseParen] FullStop
//!
//! statement   = (!FullStop ANY)+ FullStop   -- see method.rs sub-grammars
//! serves      = "Serves" Int FullStop
//!
//! ANY         = { any token }
//! ```
//! Paragraphs are separated by blank lines. Newlines inside a method
//! statement are treated as spaces.

mod block_parser;
mod ingredient;
mod method;
mod token_stream;

use crate::error::{label, PassResult, SourceDiag, SourceReport, Stage};
use crate::lexer::T;
use crate::located::Located;
use crate::model::{MethodStepKind, Operand, Program, Recipe};
use crate::scope::{CloseError, ScopeTracker};
use crate::span::{LineIndex, Span};

pub(crate) use block_parser::BlockParser;
use token_stream::{Token, TokenStream};

/// Parse a Chef source file into a [`Program`]
///
/// The parser recovers at line, statement and paragraph boundaries, so the
/// report may carry several diagnostics for one pass. The output program is
/// complete but only trustworthy when the report has no errors.
#[tracing::instrument(level = "debug", skip_all, fields(len = input.len()))]
pub fn parse(input: &str) -> PassResult<Program> {
    let mut parser = Parser::new(input);
    let mut program = Program::default();
    while parser.peek_paragraph().is_some() {
        parser.recipe(&mut program);
    }
    if program.recipes.is_empty() && !parser.report.has_errors() {
        parser.report.error(SourceDiag::error(
            "source contains no recipes",
            label!(Span::pos(0)),
            Stage::Parse,
        ));
    }
    PassResult::new(Some(program), parser.report)
}

/// What a paragraph looks like it starts, decided from its first tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParKind {
    Ingredients,
    CookingTime,
    OvenTemperature,
    Method,
    Serves,
    Other,
}

fn is_separator(tok: &Token) -> bool {
    matches!(tok.kind, T![ws] | T![newline])
}

fn is_line_empty(line: &[Token]) -> bool {
    line.iter().all(is_separator)
}

fn classify(input: &str, par: &[Token]) -> ParKind {
    let mut it = par.iter().filter(|t| !is_separator(t));
    let text = |t: &Token| &input[t.span.range()];
    let (Some(t0), t1, t2) = (it.next(), it.next(), it.next()) else {
        return ParKind::Other;
    };
    if t0.kind != T![word] {
        return ParKind::Other;
    }
    match (text(t0), t1.map(|t| t.kind)) {
        ("Ingredients", Some(T![.])) => ParKind::Ingredients,
        ("Method", Some(T![.])) => ParKind::Method,
        ("Serves", Some(T![int])) => ParKind::Serves,
        ("Cooking", Some(T![word]))
            if text(t1.unwrap()) == "time" && t2.is_some_and(|t| t.kind == T![:]) =>
        {
            ParKind::CookingTime
        }
        ("Pre", Some(T![-]))
            if t2.is_some_and(|t| t.kind == T![word] && text(t) == "heat") =>
        {
            ParKind::OvenTemperature
        }
        _ => ParKind::Other,
    }
}

struct Parser<'i> {
    input: &'i str,
    tokens: std::iter::Peekable<TokenStream<'i>>,
    pending: Option<Vec<Token>>,
    report: SourceReport,
    lidx: LineIndex,
}

impl<'i> Parser<'i> {
    fn new(input: &'i str) -> Self {
        Self {
            input,
            tokens: TokenStream::new(input).peekable(),
            pending: None,
            report: SourceReport::empty(),
            lidx: LineIndex::new(input),
        }
    }

    fn pull_line(&mut self, buf: &mut Vec<Token>) -> bool {
        let start = buf.len();
        for tok in self.tokens.by_ref() {
            buf.push(tok);
            if tok.kind == T![newline] {
                break;
            }
        }
        buf.len() > start
    }

    /// Advances to the next paragraph: a run of non-blank lines, trailing
    /// separators trimmed.
    fn next_paragraph(&mut self) -> Option<Vec<Token>> {
        let mut buf = Vec::new();

        // Eat empty lines
        loop {
            let start = buf.len();
            if !self.pull_line(&mut buf) {
                return None;
            }
            if !is_line_empty(&buf[start..]) {
                buf.drain(..start);
                break;
            }
        }

        // Take lines until a blank one
        loop {
            let start = buf.len();
            if !self.pull_line(&mut buf) {
                break;
            }
            if is_line_empty(&buf[start..]) {
                buf.truncate(start);
                break;
            }
        }

        while buf.last().is_some_and(is_separator) {
            buf.pop();
        }
        Some(buf)
    }

    fn peek_paragraph(&mut self) -> Option<&[Token]> {
        if self.pending.is_none() {
            self.pending = self.next_paragraph();
        }
        self.pending.as_deref()
    }

    fn take_paragraph(&mut self) -> Option<Vec<Token>> {
        if self.pending.is_none() {
            self.pending = self.next_paragraph();
        }
        self.pending.take()
    }

    fn peek_kind(&mut self) -> Option<ParKind> {
        let input = self.input;
        self.peek_paragraph().map(|par| classify(input, par))
    }

    fn error(&mut self, diag: SourceDiag) {
        self.report.error(diag);
    }

    fn recipe(&mut self, program: &mut Program) {
        let title_par = self.take_paragraph().expect("caller peeked a paragraph");
        let Some((title, title_span)) = self.title(&title_par) else {
            return;
        };
        let mut recipe = Recipe::new(title, title_span);
        tracing::debug!("parsing recipe '{}'", recipe.title);

        // A paragraph not starting with "Ingredients." is a comment block
        if self
            .peek_kind()
            .is_some_and(|kind| kind != ParKind::Ingredients)
        {
            let _ = self.take_paragraph();
        }

        if self.peek_kind() == Some(ParKind::Ingredients) {
            let par = self.take_paragraph().unwrap();
            self.ingredients(&par, &mut recipe);
        } else {
            self.error(SourceDiag::error(
                format!("missing 'Ingredients.' in recipe '{}'", recipe.title),
                label!(title_span),
                Stage::Parse,
            ));
        }

        if self.peek_kind() == Some(ParKind::CookingTime) {
            let par = self.take_paragraph().unwrap();
            self.cooking_time(&par);
        }

        if self.peek_kind() == Some(ParKind::OvenTemperature) {
            let par = self.take_paragraph().unwrap();
            self.oven_temperature(&par);
        }

        if self.peek_kind() == Some(ParKind::Method) {
            let par = self.take_paragraph().unwrap();
            self.method(&par, &mut recipe);
        } else {
            self.error(SourceDiag::error(
                format!("missing 'Method.' in recipe '{}'", recipe.title),
                label!(title_span),
                Stage::Parse,
            ));
        }

        if self.peek_kind() == Some(ParKind::Serves) {
            let par = self.take_paragraph().unwrap();
            self.serves(&par, &mut recipe);
        }

        tracing::debug!(
            ingredients = recipe.ingredients.len(),
            steps = recipe.method.len(),
            serves = recipe.serves,
            "parsed recipe '{}'",
            recipe.title,
        );
        program.recipes.insert(recipe.title.clone(), recipe);
    }

    /// Everything up to the first full stop of the paragraph
    fn title(&mut self, par: &[Token]) -> Option<(String, Span)> {
        let start = par.first()?.span.start();
        match par.iter().position(|t| t.kind == T![.]) {
            Some(i) => {
                let end = par[i].span.start();
                let title = self.input[start..end].trim();
                if title.is_empty() {
                    self.error(SourceDiag::error(
                        "empty recipe title",
                        label!(par[i].span),
                        Stage::Parse,
                    ));
                    return None;
                }
                if par[i + 1..].iter().any(|t| !is_separator(t)) {
                    let junk = &par[i + 1..];
                    self.error(SourceDiag::error(
                        "unexpected text after recipe title",
                        label!(Span::new(
                            junk.first().unwrap().span.start(),
                            junk.last().unwrap().span.end()
                        )),
                        Stage::Parse,
                    ));
                }
                Some((title.to_owned(), Span::new(start, end)))
            }
            None => {
                let end = par.last().unwrap().span.end();
                self.error(SourceDiag::error(
                    "expected '.' after recipe title",
                    label!(Span::pos(end)),
                    Stage::Parse,
                ));
                let title = self.input[start..end].trim();
                if title.is_empty() {
                    return None;
                }
                Some((title.to_owned(), Span::new(start, end)))
            }
        }
    }

    fn ingredients(&mut self, par: &[Token], recipe: &mut Recipe) {
        let mut lines = par.split(|t| t.kind == T![newline]);

        let header = lines.next().expect("classified paragraph");
        let mut bp = BlockParser::new(header, self.input, &mut self.report);
        let _ = bp.consume_word("Ingredients");
        let _ = bp.consume(T![.]);
        if !bp.at_end() {
            let rest = bp.consume_rest();
            let span = bp.slice_span(rest);
            bp.error(SourceDiag::error(
                "unexpected text after 'Ingredients.'",
                label!(span),
                Stage::Parse,
            ));
        }

        for line in lines {
            if is_line_empty(line) {
                continue;
            }
            let mut bp = BlockParser::new(line, self.input, &mut self.report);
            if let Some(ing) = ingredient::ingredient_line(&mut bp) {
                tracing::trace!(
                    value = ?ing.initial_value,
                    tag = %ing.initial_tag,
                    "ingredient '{}'",
                    ing.name,
                );
                // a later definition silently replaces an earlier one
                recipe.ingredients.insert(ing.name.clone(), ing);
            }
        }
    }

    fn cooking_time(&mut self, par: &[Token]) {
        let mut bp = BlockParser::new(par, self.input, &mut self.report);
        let _ = bp.consume_word("Cooking");
        let _ = bp.consume_word("time");
        let _ = bp.consume(T![:]);
        let Some(time) = integer(&mut bp) else { return };
        match bp.peek_token() {
            Some(tok) if bp.at_any_word(&["hour", "hours", "minute", "minutes"]) => {
                let _ = bp.next_token();
                let (singular, plural) = if bp.token_str(tok).starts_with('h') {
                    ("hour", "hours")
                } else {
                    ("minute", "minutes")
                };
                method::check_unit_plurality(&mut bp, *time.value(), tok, singular, plural);
            }
            _ => {
                let span = bp.current_span();
                bp.error(SourceDiag::error(
                    "expected a time unit: 'hours' or 'minutes'",
                    label!(span),
                    Stage::Parse,
                ));
                return;
            }
        }
        expect_paragraph_end(&mut bp, "cooking time");
    }

    fn oven_temperature(&mut self, par: &[Token]) {
        let mut bp = BlockParser::new(par, self.input, &mut self.report);
        let _ = bp.consume_word("Pre");
        let _ = bp.consume(T![-]);
        for word in ["heat", "oven", "to"] {
            if bp.consume_word(word).is_none() {
                let span = bp.current_span();
                bp.error(SourceDiag::error(
                    format!("expected '{word}'"),
                    label!(span),
                    Stage::Parse,
                ));
                return;
            }
        }
        let Some(_temperature) = integer(&mut bp) else { return };
        for word in ["degrees", "Celcius"] {
            if bp.consume_word(word).is_none() {
                let span = bp.current_span();
                bp.error(SourceDiag::error(
                    format!("expected '{word}'"),
                    label!(span),
                    Stage::Parse,
                ));
                return;
            }
        }
        if bp.consume(T!['(']).is_some() {
            for word in ["gas", "mark"] {
                if bp.consume_word(word).is_none() {
                    let span = bp.current_span();
                    bp.error(SourceDiag::error(
                        format!("expected '{word}'"),
                        label!(span),
                        Stage::Parse,
                    ));
                    return;
                }
            }
            let Some(_gas_mark) = integer(&mut bp) else { return };
            if bp.consume(T![')']).is_none() {
                let span = bp.current_span();
                bp.error(SourceDiag::error(
                    "expected ')'",
                    label!(span),
                    Stage::Parse,
                ));
                return;
            }
        }
        expect_paragraph_end(&mut bp, "oven temperature");
    }

    fn method(&mut self, par: &[Token], recipe: &mut Recipe) {
        let header_stop = par
            .iter()
            .position(|t| t.kind == T![.])
            .expect("classified paragraph");
        let rest = &par[header_stop + 1..];

        let mut scope = ScopeTracker::new();
        let mut start = 0;
        for (i, tok) in rest.iter().enumerate() {
            if tok.kind != T![.] {
                continue;
            }
            let stmt = &rest[start..i];
            if !is_line_empty(stmt) {
                let span = Span::new(
                    stmt.iter()
                        .find(|t| !is_separator(t))
                        .map(|t| t.span.start())
                        .unwrap_or(tok.span.start()),
                    tok.span.end(),
                );
                self.statement(stmt, span, recipe, &mut scope);
            }
            start = i + 1;
        }
        let tail = &rest[start..];
        if !is_line_empty(tail) {
            self.error(SourceDiag::error(
                "method statement missing its '.'",
                label!(Span::pos(tail.last().unwrap().span.end())),
                Stage::Parse,
            ));
        }

        for (verb, span) in scope.finish() {
            self.error(
                SourceDiag::error(
                    format!("loop '{verb}' is never closed"),
                    label!(span),
                    Stage::Parse,
                )
                .hint(format!(
                    "close it with 'Until {}'",
                    method::expected_participle(&verb)
                )),
            );
        }
    }

    fn statement(
        &mut self,
        toks: &[Token],
        span: Span,
        recipe: &mut Recipe,
        scope: &mut ScopeTracker,
    ) {
        let step = {
            let mut bp = BlockParser::new(toks, self.input, &mut self.report);
            match method::method_statement(&mut bp, span) {
                Some(step) => step,
                None => return,
            }
        };
        tracing::trace!("statement {step}");

        for op in &step.operands {
            if let Operand::Ingredient { name, span } = op {
                if !recipe.ingredients.contains_key(name) {
                    self.report.error(
                        SourceDiag::error(
                            format!("unknown ingredient '{name}'"),
                            label!(*span),
                            Stage::Parse,
                        )
                        .hint("every ingredient used by the method must appear in the ingredient list"),
                    );
                }
            }
        }

        let idx = recipe.method.len();
        recipe.method.push(step);

        match recipe.method[idx].kind {
            MethodStepKind::VerbBegin => {
                let verb = recipe.method[idx]
                    .operand(0)
                    .as_verb()
                    .expect("verb operand")
                    .to_owned();
                let expected = method::expected_participle(&verb);
                scope.open(verb, expected, span, idx);
            }
            MethodStepKind::SetAside => {
                if scope.set_aside(idx).is_err() {
                    self.error(SourceDiag::error(
                        "'Set aside' outside of any loop",
                        label!(span),
                        Stage::Parse,
                    ));
                }
            }
            MethodStepKind::UntilVerbed => {
                let participle = recipe.method[idx]
                    .operand(0)
                    .as_verb()
                    .expect("participle operand")
                    .to_owned();
                match scope.close(&participle, idx, &mut recipe.method) {
                    Ok(()) => {}
                    Err(CloseError::Unmatched) => {
                        self.error(SourceDiag::error(
                            format!("'Until {participle}' does not close any loop"),
                            label!(span),
                            Stage::Parse,
                        ));
                    }
                    Err(CloseError::Mismatch {
                        verb,
                        verb_span,
                        expected,
                    }) => {
                        let (line, col) = self.lidx.line_col(verb_span.start());
                        self.report.error(
                            SourceDiag::error(
                                format!(
                                    "'Until {participle}' does not close the loop \
                                     '{verb}' opened at {line}:{col}"
                                ),
                                label!(span),
                                Stage::Parse,
                            )
                            .label(label!(verb_span, "loop opened here"))
                            .hint(format!("close it with 'Until {expected}'")),
                        );
                    }
                }
            }
            _ => {}
        }
    }

    fn serves(&mut self, par: &[Token], recipe: &mut Recipe) {
        let mut bp = BlockParser::new(par, self.input, &mut self.report);
        let _ = bp.consume_word("Serves");
        let Some(count) = integer(&mut bp) else { return };
        let Ok(count_u32) = u32::try_from(*count.value()) else {
            bp.error(SourceDiag::error(
                "serves count out of range",
                label!(count.span()),
                Stage::Parse,
            ));
            return;
        };
        if bp.consume(T![.]).is_none() {
            let span = bp.current_span();
            bp.error(SourceDiag::error(
                "expected '.' after the serves count",
                label!(span),
                Stage::Parse,
            ));
            return;
        }
        expect_paragraph_end(&mut bp, "serves statement");
        recipe.serves = count_u32;
    }

}

fn expect_paragraph_end(bp: &mut BlockParser, what: &str) {
    if !bp.at_end() {
        let rest = bp.consume_rest();
        let span = bp.slice_span(rest);
        bp.error(SourceDiag::error(
            format!("unexpected text after {what}"),
            label!(span),
            Stage::Parse,
        ));
    }
}

/// Parses an optional, possibly negative, integer. `None` means there is no
/// number at the current position.
pub(crate) fn opt_integer(bp: &mut BlockParser) -> Option<Located<i64>> {
    bp.with_recover(|bp| {
        let minus = bp.consume(T![-]);
        let tok = bp.consume(T![int])?;
        let span = match minus {
            Some(m) => Span::new(m.span.start(), tok.span.end()),
            None => tok.span,
        };
        // parse through i128 so the sign applies before the range check and
        // i64::MIN literals survive
        let magnitude: i128 = bp.token_str(tok).parse().unwrap_or(i128::MAX);
        let signed = if minus.is_some() { -magnitude } else { magnitude };
        let value = match i64::try_from(signed) {
            Ok(v) => v,
            Err(_) => {
                bp.error(SourceDiag::error(
                    "number out of range",
                    label!(tok.span),
                    Stage::Parse,
                ));
                0
            }
        };
        Some(Located::new(value, span))
    })
}

/// Like [`opt_integer`] but the number is mandatory
pub(crate) fn integer(bp: &mut BlockParser) -> Option<Located<i64>> {
    match opt_integer(bp) {
        Some(v) => Some(v),
        None => {
            let span = bp.current_span();
            bp.error(SourceDiag::error(
                "expected a number",
                label!(span),
                Stage::Parse,
            ));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ValueTag;
    use indoc::indoc;
    use MethodStepKind::*;

    fn parse_valid(src: &str) -> Program {
        let result = parse(src);
        assert!(
            !result.report().has_errors(),
            "unexpected errors: {}",
            result.report()
        );
        result.unwrap_output()
    }

    #[test]
    fn program_structure() {
        let program = parse_valid(indoc! {"
            Buttered toast.

            A comment block, happily ignored.
            Even across lines.

            Ingredients.
            2 g bread
            1 heaped tablespoon butter
            5 ml milk

            Cooking time: 3 minutes.

            Pre-heat oven to 180 degrees Celcius (gas mark 4).

            Method.
            Put bread into the mixing bowl.
            Add butter to the mixing bowl.
            Pour contents of the mixing bowl into the baking dish.

            Serves 1.

            Side of jam.

            Ingredients.
            1 g jam

            Method.
            Put jam into the mixing bowl.
        "});

        assert_eq!(program.recipes.len(), 2);
        let entry = program.entry().unwrap();
        assert_eq!(entry.title, "Buttered toast");
        assert_eq!(entry.serves, 1);

        // declaration order survives
        let names: Vec<&str> = entry.ingredients.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["bread", "butter", "milk"]);
        assert_eq!(entry.ingredient("butter").unwrap().initial_tag, ValueTag::Dry);
        assert_eq!(entry.ingredient("milk").unwrap().initial_tag, ValueTag::Liquid);

        let kinds: Vec<MethodStepKind> = entry.method.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![Put, Add, Pour]);

        let aux = program.recipe("Side of jam").unwrap();
        assert_eq!(aux.serves, 0);
    }

    #[test]
    fn loop_offsets_are_patched() {
        let program = parse_valid(indoc! {"
            Spin cycle.

            Ingredients.
            4 g counter

            Method.
            Bake the counter.
            Put counter into the mixing bowl.
            Set aside.
            Until baked.
        "});
        let method = &program.entry().unwrap().method;
        assert_eq!(method[0].kind, VerbBegin);
        assert_eq!(method[0].jump_offset, 3);
        assert_eq!(method[2].kind, SetAside);
        assert_eq!(method[2].jump_offset, 1);
        assert_eq!(method[3].kind, UntilVerbed);
        assert_eq!(method[3].jump_offset, -3);
    }

    #[test]
    fn verb_operands() {
        let program = parse_valid(indoc! {"
            Loop de loop.

            Ingredients.
            2 g eggs

            Method.
            Fry the eggs.
            Until fried eggs.
        "});
        let method = &program.entry().unwrap().method;
        assert_eq!(method[0].operand(0).as_verb(), Some("Fry"));
        assert_eq!(method[0].operand(1).as_ingredient().map(|(n, _)| n), Some("eggs"));
        assert_eq!(method[1].operand(0).as_verb(), Some("fried"));
        assert_eq!(method[1].operand(1).as_ingredient().map(|(n, _)| n), Some("eggs"));
    }

    #[test]
    fn empty_title_is_an_error() {
        let report = parse(".\n\nIngredients.\n\nMethod.\n").into_report();
        assert!(report.errors().any(|d| d.message.contains("empty recipe title")));
    }

    #[test]
    fn title_without_full_stop_recovers() {
        let result = parse(indoc! {"
            Unpunctuated

            Ingredients.
            1 g salt

            Method.
            Put salt into the mixing bowl.
        "});
        assert!(result.report().has_errors());
        // the recipe is still built so later diagnostics make sense
        let program = result.unwrap_output();
        assert!(program.recipe("Unpunctuated").is_some());
    }

    #[test]
    fn missing_sections_are_reported() {
        let report = parse("Just a title.\n").into_report();
        assert!(report.errors().any(|d| d.message.contains("Ingredients")));
        assert!(report.errors().any(|d| d.message.contains("Method")));
    }

    #[test]
    fn negative_initial_value() {
        let program = parse_valid(indoc! {"
            Freezer burn.

            Ingredients.
            -40 g liquid nitrogen

            Method.
        "});
        let ing = program.entry().unwrap().ingredient("liquid nitrogen").unwrap();
        assert_eq!(ing.initial_value, Some(-40));
    }

    #[test]
    fn ingredient_without_amount() {
        let program = parse_valid(indoc! {"
            To taste.

            Ingredients.
            salt

            Method.
        "});
        let ing = program.entry().unwrap().ingredient("salt").unwrap();
        assert_eq!(ing.initial_value, None);
        assert_eq!(ing.initial_tag, ValueTag::Dry);
    }

    #[test]
    fn set_aside_outside_loop_is_an_error() {
        let report = parse(indoc! {"
            Loose ends.

            Ingredients.
            1 g salt

            Method.
            Set aside.
        "})
        .into_report();
        assert!(report.errors().any(|d| d.message.contains("Set aside")));
    }

    #[test]
    fn heaped_with_wet_measure_is_an_error() {
        let report = parse(indoc! {"
            Impossible spoon.

            Ingredients.
            3 heaped ml oil

            Method.
        "})
        .into_report();
        assert!(report.errors().any(|d| d.message.contains("heaped")));
    }

    #[test]
    fn empty_source_is_an_error() {
        let report = parse("").into_report();
        assert!(report.has_errors());
    }
}
