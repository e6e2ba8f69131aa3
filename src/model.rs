//! Compiled program representation
//!
//! A [`Program`] is what the parser produces: recipes in source order, each
//! with its ingredient table and compiled method step list. The model is
//! immutable after parsing; all runtime state lives in the interpreter.

use indexmap::IndexMap;
use serde::Serialize;
use smallvec::SmallVec;

use crate::span::Span;

/// Tag carried by every numeric value
///
/// Dry values serialise as decimal integers, liquid values as the unicode
/// code point of their value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ValueTag {
    Dry,
    Liquid,
}

/// A named integer variable of a recipe
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ingredient {
    /// Case sensitive name, unique within a recipe
    pub name: String,
    /// Initial value, if the ingredient line declared one
    pub initial_value: Option<i64>,
    /// Initial tag, from the measure of the ingredient line
    pub initial_tag: ValueTag,
    /// Location of the defining ingredient line
    pub declared: Span,
}

/// Kind of a compiled method step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
pub enum MethodStepKind {
    Take,
    Put,
    Fold,
    Add,
    Remove,
    Combine,
    Divide,
    AddDry,
    LiquefyBowl,
    LiquefyIngredient,
    StirBowl,
    StirIngredient,
    Mix,
    Clean,
    Pour,
    VerbBegin,
    UntilVerbed,
    SetAside,
    Serve,
    Refrigerate,
}

/// Operand of a method step
///
/// A tagged variant instead of a dispatch hierarchy; the interpreter matches
/// exhaustively on it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Operand {
    /// Reference to an ingredient of the enclosing recipe, by name
    Ingredient { name: String, span: Span },
    /// 1-based mixing bowl index
    MixingBowl(u32),
    /// 1-based baking dish index
    BakingDish(u32),
    /// Literal number, e.g. stir minutes or refrigerate hours
    Number(i64),
    /// Reference to another recipe, by title
    Recipe { title: String, span: Span },
    /// The lemma of a loop-opening verb
    Verb(String),
}

impl Operand {
    pub fn as_ingredient(&self) -> Option<(&str, Span)> {
        match self {
            Operand::Ingredient { name, span } => Some((name, *span)),
            _ => None,
        }
    }

    pub fn as_mixing_bowl(&self) -> Option<u32> {
        match self {
            Operand::MixingBowl(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_baking_dish(&self) -> Option<u32> {
        match self {
            Operand::BakingDish(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<i64> {
        match self {
            Operand::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_recipe(&self) -> Option<(&str, Span)> {
        match self {
            Operand::Recipe { title, span } => Some((title, *span)),
            _ => None,
        }
    }

    pub fn as_verb(&self) -> Option<&str> {
        match self {
            Operand::Verb(v) => Some(v),
            _ => None,
        }
    }
}

impl std::fmt::Display for Operand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operand::Ingredient { name, .. } => write!(f, "ingredient '{name}'"),
            Operand::MixingBowl(n) => write!(f, "mixing bowl {n}"),
            Operand::BakingDish(n) => write!(f, "baking dish {n}"),
            Operand::Number(n) => write!(f, "{n}"),
            Operand::Recipe { title, .. } => write!(f, "recipe '{title}'"),
            Operand::Verb(v) => write!(f, "verb '{v}'"),
        }
    }
}

/// A single compiled method step
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodStep {
    pub kind: MethodStepKind,
    pub operands: SmallVec<[Operand; 2]>,
    /// Span of the whole statement, full stop included
    pub span: Span,
    /// Relative jump distance, patched by the scope resolver
    ///
    /// Only meaningful for `VerbBegin` (forward, to the matching
    /// `UntilVerbed`), `UntilVerbed` (backward, to the matching `VerbBegin`)
    /// and `SetAside` (forward, to the innermost enclosing `UntilVerbed`).
    pub jump_offset: isize,
}

impl MethodStep {
    pub(crate) fn new(kind: MethodStepKind, span: Span) -> Self {
        Self {
            kind,
            operands: SmallVec::new(),
            span,
            jump_offset: 0,
        }
    }

    pub(crate) fn with_operands(
        kind: MethodStepKind,
        span: Span,
        operands: impl IntoIterator<Item = Operand>,
    ) -> Self {
        Self {
            kind,
            operands: operands.into_iter().collect(),
            span,
            jump_offset: 0,
        }
    }

    pub fn operand(&self, idx: usize) -> &Operand {
        &self.operands[idx]
    }
}

impl std::fmt::Display for MethodStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}(", self.kind)?;
        for (i, op) in self.operands.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{op}")?;
        }
        f.write_str(")")?;
        if self.jump_offset != 0 {
            write!(f, " [{:+}]", self.jump_offset)?;
        }
        Ok(())
    }
}

/// A named unit of code: ingredient table plus method list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recipe {
    pub title: String,
    pub title_span: Span,
    /// Number of baking dishes served as output. 0 means no serves line.
    pub serves: u32,
    /// Ingredients in declaration order. A later definition of the same name
    /// replaces the earlier one.
    pub ingredients: IndexMap<String, Ingredient>,
    pub method: Vec<MethodStep>,
}

impl Recipe {
    pub(crate) fn new(title: String, title_span: Span) -> Self {
        Self {
            title,
            title_span,
            serves: 0,
            ingredients: IndexMap::new(),
            method: Vec::new(),
        }
    }

    pub fn ingredient(&self, name: &str) -> Option<&Ingredient> {
        self.ingredients.get(name)
    }
}

/// A parsed source file: recipes in source order
///
/// The first recipe is the entry point; the others are auxiliary recipes
/// callable with `Serve with`.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct Program {
    pub recipes: IndexMap<String, Recipe>,
}

impl Program {
    /// The entry-point recipe: first declared in source order
    pub fn entry(&self) -> Option<&Recipe> {
        self.recipes.first().map(|(_, r)| r)
    }

    /// Look up a recipe by exact title
    pub fn recipe(&self, title: &str) -> Option<&Recipe> {
        self.recipes.get(title)
    }
}
