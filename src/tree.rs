//! Safety concept tree: requirements refined into sub-requirements by AND,
//! OR or NOT decomposition, down to leaves that are either assumed about the
//! context or must be provided by the system.

use std::fmt;

use crate::error::NameError;

/// Variant of a requirement, which also determines its symbol prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RequirementKind {
    Refined,
    ContextAssumption,
    Undeveloped,
    Technical,
    Empty,
    ParameterContext,
}

impl RequirementKind {
    const ALL: [RequirementKind; 6] = [
        RequirementKind::Refined,
        RequirementKind::ContextAssumption,
        RequirementKind::Undeveloped,
        RequirementKind::Technical,
        RequirementKind::Empty,
        RequirementKind::ParameterContext,
    ];

    pub fn prefix(self) -> char {
        match self {
            RequirementKind::Refined => 'g',
            RequirementKind::ContextAssumption => 'e',
            RequirementKind::Undeveloped => 'u',
            RequirementKind::Technical => 't',
            RequirementKind::Empty => 'n',
            RequirementKind::ParameterContext => 'p',
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// Identifier of a requirement such as `t1` or `e3`, unique within a tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol {
    kind: RequirementKind,
    index: u32,
}

impl Symbol {
    pub fn new(kind: RequirementKind, index: u32) -> Self {
        Self { kind, index }
    }

    pub fn kind(&self) -> RequirementKind {
        self.kind
    }

    pub fn index(&self) -> u32 {
        self.index
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.prefix(), self.index)
    }
}

impl std::str::FromStr for Symbol {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let prefix = chars.next().ok_or(NameError::EmptySymbol)?;
        let kind = RequirementKind::ALL
            .into_iter()
            .find(|k| k.prefix() == prefix)
            .ok_or(NameError::UnknownPrefix { prefix })?;
        let index = chars
            .as_str()
            .parse()
            .map_err(|_| NameError::InvalidIndex { symbol: s.to_owned() })?;

        Ok(Symbol::new(kind, index))
    }
}

/// Hands out symbols from one counter per requirement kind, starting at 1.
///
/// Each tree gets its own allocator so symbols are reproducible across runs.
#[derive(Clone, Debug, Default)]
pub struct SymbolAllocator {
    counters: [u32; 6],
}

impl SymbolAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self, kind: RequirementKind) -> Symbol {
        let counter = &mut self.counters[kind.slot()];

        *counter += 1;

        Symbol::new(kind, *counter)
    }

    pub fn reset(&mut self) {
        self.counters = [0; 6];
    }
}

/// How a refined requirement is discharged by its children.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Decomposition {
    /// All children must hold.
    And,
    /// Any one child suffices.
    Or,
    Not,
}

/// Fields shared by every leaf requirement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Leaf {
    symbol: Symbol,
    description: String,
    name: Option<String>,
}

impl Leaf {
    pub fn symbol(&self) -> Symbol {
        self.symbol
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Short display name, e.g. `NoHumans`.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefinedRequirement {
    symbol: Symbol,
    description: String,
    decomposition: Option<Decomposition>,
    children: Vec<Requirement>,
}

impl RefinedRequirement {
    pub fn symbol(&self) -> Symbol {
        self.symbol
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn decomposition(&self) -> Option<Decomposition> {
        self.decomposition
    }

    pub fn children(&self) -> &[Requirement] {
        &self.children
    }
}

/// A requirement the system must provide, optionally annotated with the
/// parameter context it was specified for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TechnicalRequirement {
    leaf: Leaf,
    parameter_context: Option<Leaf>,
}

impl TechnicalRequirement {
    pub fn parameter_context(&self) -> Option<&Leaf> {
        self.parameter_context.as_ref()
    }
}

impl std::ops::Deref for TechnicalRequirement {
    type Target = Leaf;

    fn deref(&self) -> &Leaf {
        &self.leaf
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Requirement {
    Refined(RefinedRequirement),
    /// Something assumed to hold in the operating environment.
    ContextAssumption(Leaf),
    /// A requirement that has not been refined further.
    Undeveloped(Leaf),
    Technical(TechnicalRequirement),
    Empty(Leaf),
    ParameterContext(Leaf),
}

impl Requirement {
    pub fn kind(&self) -> RequirementKind {
        match self {
            Requirement::Refined(_) => RequirementKind::Refined,
            Requirement::ContextAssumption(_) => RequirementKind::ContextAssumption,
            Requirement::Undeveloped(_) => RequirementKind::Undeveloped,
            Requirement::Technical(_) => RequirementKind::Technical,
            Requirement::Empty(_) => RequirementKind::Empty,
            Requirement::ParameterContext(_) => RequirementKind::ParameterContext,
        }
    }

    pub fn symbol(&self) -> Symbol {
        match self {
            Requirement::Refined(r) => r.symbol,
            Requirement::ContextAssumption(l)
            | Requirement::Undeveloped(l)
            | Requirement::Empty(l)
            | Requirement::ParameterContext(l) => l.symbol,
            Requirement::Technical(t) => t.leaf.symbol,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Requirement::Refined(r) => &r.description,
            Requirement::ContextAssumption(l)
            | Requirement::Undeveloped(l)
            | Requirement::Empty(l)
            | Requirement::ParameterContext(l) => &l.description,
            Requirement::Technical(t) => &t.leaf.description,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.leaf().and_then(Leaf::name)
    }

    /// The leaf fields, unless this is a refined requirement.
    pub fn leaf(&self) -> Option<&Leaf> {
        match self {
            Requirement::Refined(_) => None,
            Requirement::ContextAssumption(l)
            | Requirement::Undeveloped(l)
            | Requirement::Empty(l)
            | Requirement::ParameterContext(l) => Some(l),
            Requirement::Technical(t) => Some(&t.leaf),
        }
    }

    pub fn is_leaf(&self) -> bool {
        !matches!(self, Requirement::Refined(_))
    }

    pub fn children(&self) -> &[Requirement] {
        match self {
            Requirement::Refined(r) => &r.children,
            _ => &[],
        }
    }

    /// Depth-first pre-order walk over this requirement and all descendants.
    pub fn iter(&self) -> Iter<'_> {
        Iter { stack: vec![self] }
    }

    /// All descendants (including this node) of the given kind.
    pub fn of_kind(&self, kind: RequirementKind) -> impl Iterator<Item = &Requirement> {
        self.iter().filter(move |r| r.kind() == kind)
    }

    pub fn leaves(&self) -> impl Iterator<Item = &Requirement> {
        self.iter().filter(|r| r.is_leaf())
    }

    pub fn find(&self, symbol: Symbol) -> Option<&Requirement> {
        self.iter().find(|r| r.symbol() == symbol)
    }
}

pub struct Iter<'t> {
    stack: Vec<&'t Requirement>,
}

impl<'t> Iterator for Iter<'t> {
    type Item = &'t Requirement;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;

        self.stack.extend(node.children().iter().rev());

        Some(node)
    }
}

/// Builds requirements, assigning each a fresh symbol.
///
/// ```
/// use fuzzy_safety::tree::{Decomposition, TreeBuilder};
///
/// let mut tree = TreeBuilder::new();
/// let t1 = tree.technical("Brake within 2 m", None);
/// let u1 = tree.undeveloped("Detect humans", None);
/// let root = tree.refined("Safe departure", Decomposition::And, vec![t1, u1]);
///
/// assert_eq!(root.symbol().to_string(), "g1");
/// ```
#[derive(Debug, Default)]
pub struct TreeBuilder {
    symbols: SymbolAllocator,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_allocator(symbols: SymbolAllocator) -> Self {
        Self { symbols }
    }

    pub fn into_allocator(self) -> SymbolAllocator {
        self.symbols
    }

    fn leaf(&mut self, kind: RequirementKind, description: impl Into<String>, name: Option<&str>) -> Leaf {
        Leaf {
            symbol: self.symbols.allocate(kind),
            description: description.into(),
            name: name.map(str::to_owned),
        }
    }

    pub fn refined(
        &mut self,
        description: impl Into<String>,
        decomposition: Decomposition,
        children: Vec<Requirement>,
    ) -> Requirement {
        self.refined_with(description, Some(decomposition), children)
    }

    /// A refined requirement whose decomposition may still be unknown.
    pub fn refined_with(
        &mut self,
        description: impl Into<String>,
        decomposition: Option<Decomposition>,
        children: Vec<Requirement>,
    ) -> Requirement {
        Requirement::Refined(RefinedRequirement {
            symbol: self.symbols.allocate(RequirementKind::Refined),
            description: description.into(),
            decomposition,
            children,
        })
    }

    pub fn context_assumption(&mut self, description: impl Into<String>, name: Option<&str>) -> Requirement {
        Requirement::ContextAssumption(self.leaf(RequirementKind::ContextAssumption, description, name))
    }

    pub fn undeveloped(&mut self, description: impl Into<String>, name: Option<&str>) -> Requirement {
        Requirement::Undeveloped(self.leaf(RequirementKind::Undeveloped, description, name))
    }

    pub fn technical(&mut self, description: impl Into<String>, name: Option<&str>) -> Requirement {
        Requirement::Technical(TechnicalRequirement {
            leaf: self.leaf(RequirementKind::Technical, description, name),
            parameter_context: None,
        })
    }

    /// A technical requirement annotated with the parameter context it holds in.
    pub fn technical_with_parameter(
        &mut self,
        description: impl Into<String>,
        name: Option<&str>,
        parameter_description: impl Into<String>,
        parameter_name: Option<&str>,
    ) -> Requirement {
        let leaf = self.leaf(RequirementKind::Technical, description, name);
        let parameter = self.leaf(RequirementKind::ParameterContext, parameter_description, parameter_name);

        Requirement::Technical(TechnicalRequirement {
            leaf,
            parameter_context: Some(parameter),
        })
    }

    pub fn empty(&mut self, description: impl Into<String>, name: Option<&str>) -> Requirement {
        Requirement::Empty(self.leaf(RequirementKind::Empty, description, name))
    }

    pub fn parameter_context(&mut self, description: impl Into<String>, name: Option<&str>) -> Requirement {
        Requirement::ParameterContext(self.leaf(RequirementKind::ParameterContext, description, name))
    }
}

#[test]
fn test_symbols_per_kind() {
    let mut tree = TreeBuilder::new();
    let e1 = tree.context_assumption("No humans around", Some("NoHumans"));
    let t1 = tree.technical("Stop at the lane end", None);
    let e2 = tree.context_assumption("Enough space", None);
    let t2 = tree.technical_with_parameter("Limit speed", None, "Load below 2 t", Some("Load"));

    assert_eq!(e1.symbol().to_string(), "e1");
    assert_eq!(e2.symbol().to_string(), "e2");
    assert_eq!(t1.symbol().to_string(), "t1");
    assert_eq!(t2.symbol().to_string(), "t2");
    assert_eq!(e1.name(), Some("NoHumans"));

    let Requirement::Technical(t2) = &t2 else { unreachable!() };
    assert_eq!(t2.parameter_context().map(|p| p.symbol().to_string()), Some("p1".into()));

    let mut symbols = tree.into_allocator();
    symbols.reset();
    assert_eq!(symbols.allocate(RequirementKind::Technical).to_string(), "t1");
}

#[test]
fn test_symbol_from_str() {
    assert_eq!("u12".parse::<Symbol>(), Ok(Symbol::new(RequirementKind::Undeveloped, 12)));
    assert_eq!("x1".parse::<Symbol>(), Err(NameError::UnknownPrefix { prefix: 'x' }));
    assert_eq!("t".parse::<Symbol>(), Err(NameError::InvalidIndex { symbol: "t".to_owned() }));
    assert_eq!("".parse::<Symbol>(), Err(NameError::EmptySymbol));
}

#[test]
fn test_traversal() {
    let mut tree = TreeBuilder::new();
    let t1 = tree.technical("t", None);
    let u1 = tree.undeveloped("u1", None);
    let u2 = tree.undeveloped("u2", None);
    let alternatives = tree.refined("any", Decomposition::Or, vec![u1, u2]);
    let root = tree.refined("root", Decomposition::And, vec![t1, alternatives]);

    let order: Vec<_> = root.iter().map(|r| r.symbol().to_string()).collect();
    assert_eq!(order, ["g2", "t1", "g1", "u1", "u2"]);

    let leaves: Vec<_> = root.leaves().map(|r| r.symbol().to_string()).collect();
    assert_eq!(leaves, ["t1", "u1", "u2"]);

    assert_eq!(root.of_kind(RequirementKind::Undeveloped).count(), 2);
    assert_eq!(
        root.find("u2".parse().unwrap()).map(Requirement::description),
        Some("u2")
    );
    assert!(root.find("e1".parse().unwrap()).is_none());
}
