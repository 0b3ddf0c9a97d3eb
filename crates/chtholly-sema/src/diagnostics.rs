//! Semantic diagnostics.
//!
//! Every rule violation the analyzer can detect is a [`DiagnosticKind`].
//! The analyzer never aborts on an error: it appends a [`Diagnostic`] to its
//! buffer, poisons the offending expression with the unknown type, and keeps
//! walking, so a single run reports every problem in the file in source
//! order.

use chtholly_ast::Span;
use thiserror::Error;

/// How serious a diagnostic is. The driver's exit code is nonzero iff any
/// diagnostic with severity `Error` was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

/// Everything the analyzer can complain about.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DiagnosticKind {
    // === Name resolution ===
    #[error("Undeclared variable: {name}")]
    UndeclaredVariable { name: String },

    #[error("Undeclared type: {name}")]
    UndeclaredType { name: String },

    #[error("'{name}' is already defined in this scope")]
    Redeclaration { name: String },

    #[error("No member '{member}' on type '{type_name}'")]
    NoSuchMember { type_name: String, member: String },

    #[error("Enum '{enum_name}' has no variant '{variant}'")]
    NoSuchVariant { enum_name: String, variant: String },

    #[error("Field '{field}' given more than once in initializer")]
    DuplicateStructField { field: String },

    #[error("Missing field '{field}' in initializer")]
    MissingStructField { field: String },

    #[error("'{name}' is not a struct")]
    NotAStruct { name: String },

    #[error("'{name}' is not an enum")]
    NotAnEnum { name: String },

    // === Type mismatches ===
    #[error("Cannot assign value of type '{found}' to '{expected}'")]
    AssignmentTypeMismatch { expected: String, found: String },

    #[error("Argument {index} has type '{found}', expected '{expected}'")]
    ArgumentTypeMismatch {
        index: usize,
        expected: String,
        found: String,
    },

    #[error("Return type mismatch: expected '{expected}', got '{found}'")]
    ReturnTypeMismatch { expected: String, found: String },

    #[error("Array element has type '{found}', expected '{expected}'")]
    ArrayElementTypeMismatch { expected: String, found: String },

    #[error("Case value has type '{found}', but the switch discriminant has type '{expected}'")]
    CaseTypeMismatch { expected: String, found: String },

    #[error("Condition must be 'bool', found '{found}'")]
    NonBoolCondition { found: String },

    #[error("Operator '{op}' cannot be applied to '{left}' and '{right}'")]
    OperandTypeMismatch {
        op: String,
        left: String,
        right: String,
    },

    #[error("Array index must be an integer, found '{found}'")]
    NonIntegerIndex { found: String },

    // === Arity ===
    #[error("Expected {expected} arguments but got {got}")]
    WrongArgumentCount { expected: usize, got: usize },

    #[error("Variant '{variant}' expects {expected} payload values but got {got}")]
    WrongEnumPayloadCount {
        variant: String,
        expected: usize,
        got: usize,
    },

    // === Ownership ===
    #[error("Use of moved value: '{name}'")]
    UseAfterMove { name: String },

    // === Borrows ===
    #[error("Cannot borrow '{name}': conflicting borrow already active")]
    ConflictingBorrow { name: String },

    #[error("Cannot mutably borrow immutable variable '{name}'")]
    ImmutableBorrowedMutably { name: String },

    #[error("Cannot move '{name}' while it is borrowed")]
    MoveWhileBorrowed { name: String },

    // === Lifetimes ===
    #[error("Dangling reference: '{name}' does not live long enough")]
    DanglingReference { name: String },

    #[error("Cannot return a reference to local variable '{name}'")]
    ReferenceEscapesFunction { name: String },

    // === Mutability ===
    #[error("Cannot assign to immutable variable '{name}'")]
    AssignToImmutable { name: String },

    #[error("Cannot assign to immutable field '{field}'")]
    AssignToImmutableField { field: String },

    // === Control flow ===
    #[error("'break' outside of a loop or switch")]
    BreakOutsideLoopOrSwitch,

    #[error("'continue' outside of a loop")]
    ContinueOutsideLoop,

    #[error("'fallthrough' outside of a switch")]
    FallthroughOutsideSwitch,

    #[error("'fallthrough' must be the last statement in a case body")]
    FallthroughNotLast,

    #[error("Multiple 'default' cases in switch")]
    MultipleDefault,

    #[error("Duplicate case value '{value}'")]
    DuplicateCase { value: String },

    #[error("'return' outside of a function")]
    ReturnOutsideFunction,

    // === Structure ===
    #[error("Cannot access member on non-aggregate type '{found}'")]
    MemberAccessOnNonAggregate { found: String },

    #[error("'{found}' is not callable")]
    CalleeNotCallable { found: String },

    #[error("Cannot index into value of type '{found}'")]
    IndexOnNonArray { found: String },

    #[error("Cannot use 'self' outside of a class")]
    SelfOutsideClass,
}

impl DiagnosticKind {
    /// Stable error code, used in rendered output.
    pub fn code(&self) -> &'static str {
        use DiagnosticKind::*;
        match self {
            UndeclaredVariable { .. } => "E001",
            UndeclaredType { .. } => "E002",
            Redeclaration { .. } => "E003",
            NoSuchMember { .. } => "E004",
            NoSuchVariant { .. } => "E005",
            DuplicateStructField { .. } => "E006",
            MissingStructField { .. } => "E007",
            NotAStruct { .. } => "E008",
            NotAnEnum { .. } => "E009",
            AssignmentTypeMismatch { .. } => "E010",
            ArgumentTypeMismatch { .. } => "E011",
            ReturnTypeMismatch { .. } => "E012",
            ArrayElementTypeMismatch { .. } => "E013",
            CaseTypeMismatch { .. } => "E014",
            NonBoolCondition { .. } => "E015",
            OperandTypeMismatch { .. } => "E016",
            NonIntegerIndex { .. } => "E017",
            WrongArgumentCount { .. } => "E020",
            WrongEnumPayloadCount { .. } => "E021",
            UseAfterMove { .. } => "E030",
            ConflictingBorrow { .. } => "E031",
            ImmutableBorrowedMutably { .. } => "E032",
            MoveWhileBorrowed { .. } => "E033",
            DanglingReference { .. } => "E034",
            ReferenceEscapesFunction { .. } => "E035",
            AssignToImmutable { .. } => "E040",
            AssignToImmutableField { .. } => "E041",
            BreakOutsideLoopOrSwitch => "E050",
            ContinueOutsideLoop => "E051",
            FallthroughOutsideSwitch => "E052",
            FallthroughNotLast => "E053",
            MultipleDefault => "E054",
            DuplicateCase { .. } => "E055",
            ReturnOutsideFunction => "E056",
            MemberAccessOnNonAggregate { .. } => "E060",
            CalleeNotCallable { .. } => "E061",
            IndexOnNonArray { .. } => "E062",
            SelfOutsideClass => "E063",
        }
    }

    /// Optional hint rendered below the error.
    pub fn help(&self) -> Option<String> {
        use DiagnosticKind::*;
        match self {
            UseAfterMove { name } => Some(format!(
                "'{}' holds a non-Copy value; its ownership was transferred by an earlier use",
                name
            )),
            ConflictingBorrow { name } => Some(format!(
                "a mutable borrow of '{}' excludes every other borrow; shared borrows exclude mutable ones",
                name
            )),
            ImmutableBorrowedMutably { name } => {
                Some(format!("declare '{}' with 'let mut' to allow '&mut'", name))
            }
            MoveWhileBorrowed { .. } => {
                Some("the value cannot change owners while a reference to it is live".to_string())
            }
            DanglingReference { name } => Some(format!(
                "'{}' is dropped at the end of its scope, but the reference outlives it",
                name
            )),
            ReferenceEscapesFunction { .. } => {
                Some("return an owned value instead of a reference to a local".to_string())
            }
            AssignToImmutable { name } => {
                Some(format!("declare '{}' with 'let mut' to allow assignment", name))
            }
            AssignToImmutableField { field } => Some(format!(
                "declare the field as 'let mut {}' to allow assignment",
                field
            )),
            FallthroughNotLast => {
                Some("move 'fallthrough' to the end of the case body".to_string())
            }
            _ => None,
        }
    }
}

/// One diagnostic record: what went wrong, how bad, and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub span: Span,
}

impl Diagnostic {
    pub fn error(kind: DiagnosticKind, span: Span) -> Self {
        Self {
            severity: Severity::Error,
            kind,
            span,
        }
    }

    /// The human-readable message for this diagnostic.
    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}
