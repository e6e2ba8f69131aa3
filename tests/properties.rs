//! Property-based invariants of the parser and interpreter

use cheflang::{parse, Interpreter, MethodStepKind};
use proptest::prelude::*;

fn run(src: &str) -> String {
    let (program, _warnings) = parse(src).into_result().expect("program should parse");
    let mut out = Vec::new();
    Interpreter::new(&program, std::io::empty(), &mut out)
        .seed(0)
        .run()
        .expect("program should run");
    String::from_utf8(out).unwrap()
}

/// What a dry value looks like in the serialised output
fn dry(v: i64) -> String {
    format!("{v} ")
}

/// What a liquid value looks like in the serialised output
fn liquid(v: i64) -> char {
    char::from_u32(v.rem_euclid(0x0011_0000) as u32).unwrap_or(char::REPLACEMENT_CHARACTER)
}

proptest! {
    /// `Clean` followed by any sequence of `Put`s leaves the bowl with
    /// exactly those items in push order.
    #[test]
    fn clean_then_puts(values in prop::collection::vec(0i64..1000, 0..20)) {
        let mut src = String::from("Pantry stress.\n\nIngredients.\n1 g junk\n");
        for (i, v) in values.iter().enumerate() {
            src.push_str(&format!("{v} g item{i}\n"));
        }
        src.push_str("\nMethod.\n");
        src.push_str("Put junk into the mixing bowl.\n");
        src.push_str("Put junk into the mixing bowl.\n");
        src.push_str("Clean the mixing bowl.\n");
        for i in 0..values.len() {
            src.push_str(&format!("Put item{i} into the mixing bowl.\n"));
        }
        src.push_str("Pour contents of the mixing bowl into the baking dish.\n\nServes 1.\n");

        let expected: String = values.iter().map(|v| dry(*v)).collect();
        prop_assert_eq!(run(&src), format!("{expected}\n"));
    }

    /// `Put` then immediate `Fold` is identity on the ingredient's value
    /// and tag.
    #[test]
    fn put_then_fold_roundtrip(value in any::<i64>(), is_liquid in any::<bool>()) {
        let measure = if is_liquid { "ml" } else { "g" };
        let src = format!(
            "Round trip.\n\nIngredients.\n{value} {measure} sample\n1 g scratch\n\n\
             Method.\nPut sample into the mixing bowl.\n\
             Fold scratch into the mixing bowl.\n\
             Put scratch into the mixing bowl.\n\
             Pour contents of the mixing bowl into the baking dish.\n\nServes 1.\n"
        );
        let expected = if is_liquid {
            format!("{}\n", liquid(value))
        } else {
            format!("{}\n", dry(value))
        };
        prop_assert_eq!(run(&src), expected);
    }

    /// `Pour` preserves the total item count and never drains the bowl.
    #[test]
    fn pour_preserves_count(
        first in prop::collection::vec(0i64..100, 0..10),
        second in prop::collection::vec(0i64..100, 0..10),
    ) {
        let mut src = String::from("Conservation law.\n\nIngredients.\n");
        for (i, v) in first.iter().chain(&second).enumerate() {
            src.push_str(&format!("{v} g item{i}\n"));
        }
        src.push_str("\nMethod.\n");
        for i in 0..first.len() {
            src.push_str(&format!("Put item{i} into the mixing bowl.\n"));
        }
        src.push_str("Pour contents of the mixing bowl into the baking dish.\n");
        for i in first.len()..first.len() + second.len() {
            src.push_str(&format!("Put item{i} into the mixing bowl.\n"));
        }
        src.push_str("Pour contents of the mixing bowl into the baking dish.\n\nServes 1.\n");

        // the first pour leaves the bowl untouched, so the dish ends with
        // |first| + (|first| + |second|) items
        let count = run(&src).split_whitespace().count();
        prop_assert_eq!(count, 2 * first.len() + second.len());
    }

    /// Identical input bytes yield an identical program.
    #[test]
    fn parser_is_deterministic(values in prop::collection::vec(0i64..1000, 1..10)) {
        let mut src = String::from("Groundhog day.\n\nIngredients.\n");
        for (i, v) in values.iter().enumerate() {
            src.push_str(&format!("{v} g item{i}\n"));
        }
        src.push_str("\nMethod.\nPut item0 into the mixing bowl.\n");
        let a = parse(&src).unwrap_output();
        let b = parse(&src).unwrap_output();
        prop_assert_eq!(a, b);
    }

    /// For every `VerbBegin` the step at its jump target is the matching
    /// `UntilVerbed` with the negated offset, and loops nest cleanly.
    #[test]
    fn loop_offsets_are_symmetric(depth in 1usize..5) {
        const VERBS: &[(&str, &str)] = &[
            ("Bake", "baked"),
            ("Sift", "sifted"),
            ("Melt", "melted"),
            ("Chop", "chopped"),
            ("Roast", "roasted"),
        ];
        let mut src = String::from("Nested kitchen.\n\nIngredients.\n0 g counter\n\nMethod.\n");
        for (verb, _) in &VERBS[..depth] {
            src.push_str(&format!("{verb} the counter.\n"));
        }
        src.push_str("Set aside.\n");
        for (_, participle) in VERBS[..depth].iter().rev() {
            src.push_str(&format!("Until {participle}.\n"));
        }

        let result = parse(&src);
        prop_assert!(result.is_valid(), "report: {}", result.report());
        let program = result.unwrap_output();
        let method = &program.entry().unwrap().method;

        for (b, step) in method.iter().enumerate() {
            if step.kind != MethodStepKind::VerbBegin {
                continue;
            }
            prop_assert!(step.jump_offset > 0);
            let e = (b as isize + step.jump_offset) as usize;
            let close = &method[e];
            prop_assert_eq!(close.kind, MethodStepKind::UntilVerbed);
            prop_assert_eq!(close.jump_offset, -step.jump_offset);
        }

        // the innermost break jumps to its innermost close
        let brk = method
            .iter()
            .position(|s| s.kind == MethodStepKind::SetAside)
            .unwrap();
        prop_assert_eq!(method[brk].jump_offset, 1);
    }

    /// Liquefying a bowl twice is the same as liquefying it once.
    #[test]
    fn liquefy_is_idempotent(values in prop::collection::vec(32i64..127, 1..10)) {
        let build = |twice: bool| {
            let mut src = String::from("Pure water.\n\nIngredients.\n");
            for (i, v) in values.iter().enumerate() {
                src.push_str(&format!("{v} g item{i}\n"));
            }
            src.push_str("\nMethod.\n");
            for i in 0..values.len() {
                src.push_str(&format!("Put item{i} into the mixing bowl.\n"));
            }
            src.push_str("Liquefy contents of the mixing bowl.\n");
            if twice {
                src.push_str("Liquefy contents of the mixing bowl.\n");
            }
            src.push_str("Pour contents of the mixing bowl into the baking dish.\n\nServes 1.\n");
            src
        };
        prop_assert_eq!(run(&build(false)), run(&build(true)));
    }
}
