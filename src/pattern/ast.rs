#[derive(Debug, Clone, PartialEq)]
pub struct PatternAst {
    pub nodes: Vec<PatternNode>,
}

impl PatternAst {
    pub fn new(nodes: Vec<PatternNode>) -> Self {
        Self { nodes }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Parameter names in the order their capture groups appear.
    pub fn param_names(&self) -> Vec<String> {
        self.nodes
            .iter()
            .filter_map(|node| match node {
                PatternNode::Parameter(param) => Some(param.name.clone()),
                PatternNode::Literal(_) => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PatternNode {
    Literal(String),
    Parameter(ParameterNode),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// `:name`
    Named,
    /// `(regex)` keyed by its position among unnamed tokens.
    Unnamed,
    /// bare `*`
    Wildcard,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterNode {
    pub name: String,
    pub kind: ParamKind,
    pub prefix: Option<char>,
    pub constraint: Option<ParameterConstraint>,
    pub quantifier: Quantifier,
    pub partial: bool,
}

impl ParameterNode {
    pub fn new(
        name: String,
        kind: ParamKind,
        prefix: Option<char>,
        constraint: Option<ParameterConstraint>,
        quantifier: Quantifier,
    ) -> Self {
        Self {
            name,
            kind,
            prefix,
            constraint,
            quantifier,
            partial: false,
        }
    }

    /// Expression matched by a single repetition of this parameter.
    pub fn source(&self) -> String {
        match (&self.constraint, self.kind) {
            (Some(constraint), _) => constraint.raw.clone(),
            (None, ParamKind::Wildcard) => ".*".to_string(),
            (None, _) => {
                let delimiter = self.prefix.unwrap_or('/');
                format!("[^{}]+?", regex::escape(delimiter.encode_utf8(&mut [0; 4])))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterConstraint {
    pub raw: String,
}

impl ParameterConstraint {
    pub fn new(raw: String) -> Self {
        Self { raw }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantifier {
    One,
    ZeroOrOne,
    ZeroOrMore,
    OneOrMore,
}

impl Quantifier {
    pub fn from_modifier(ch: Option<char>) -> Option<Self> {
        match ch {
            Some('?') => Some(Self::ZeroOrOne),
            Some('*') => Some(Self::ZeroOrMore),
            Some('+') => Some(Self::OneOrMore),
            _ => None,
        }
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, Self::ZeroOrOne | Self::ZeroOrMore)
    }

    pub fn is_repeating(&self) -> bool {
        matches!(self, Self::ZeroOrMore | Self::OneOrMore)
    }
}
