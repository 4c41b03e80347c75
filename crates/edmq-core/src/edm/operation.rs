use crate::edm::TypeRef;
use derive_more::Display;

///
/// OperationKind
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum OperationKind {
    Action,
    Function,
}

///
/// OperationParameter
///

#[derive(Clone, Debug, PartialEq)]
pub struct OperationParameter {
    name: String,
    type_ref: TypeRef,
}

impl OperationParameter {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn type_ref(&self) -> &TypeRef {
        &self.type_ref
    }
}

///
/// Operation
///
/// Action or function. When bound, the first parameter is the binding
/// parameter and the remaining ones are supplied by the caller.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Operation {
    kind: OperationKind,
    namespace: String,
    name: String,
    full_name: String,
    parameters: Vec<OperationParameter>,
    return_type: Option<TypeRef>,
    is_bound: bool,
    is_composable: bool,
}

impl Operation {
    #[must_use]
    pub fn function(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(OperationKind::Function, namespace.into(), name.into())
    }

    #[must_use]
    pub fn action(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(OperationKind::Action, namespace.into(), name.into())
    }

    fn new(kind: OperationKind, namespace: String, name: String) -> Self {
        Self {
            kind,
            full_name: format!("{namespace}.{name}"),
            namespace,
            name,
            parameters: Vec::new(),
            return_type: None,
            is_bound: false,
            is_composable: false,
        }
    }

    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, type_ref: TypeRef) -> Self {
        self.parameters.push(OperationParameter {
            name: name.into(),
            type_ref,
        });
        self
    }

    #[must_use]
    pub fn returns(mut self, type_ref: TypeRef) -> Self {
        self.return_type = Some(type_ref);
        self
    }

    #[must_use]
    pub const fn bound(mut self) -> Self {
        self.is_bound = true;
        self
    }

    #[must_use]
    pub const fn composable(mut self) -> Self {
        self.is_composable = true;
        self
    }

    #[must_use]
    pub const fn kind(&self) -> OperationKind {
        self.kind
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    #[must_use]
    pub fn parameters(&self) -> &[OperationParameter] {
        &self.parameters
    }

    #[must_use]
    pub const fn return_type(&self) -> Option<&TypeRef> {
        self.return_type.as_ref()
    }

    #[must_use]
    pub const fn is_bound(&self) -> bool {
        self.is_bound
    }

    #[must_use]
    pub const fn is_composable(&self) -> bool {
        self.is_composable
    }

    #[must_use]
    pub fn binding_parameter(&self) -> Option<&OperationParameter> {
        if self.is_bound {
            self.parameters.first()
        } else {
            None
        }
    }

    /// Parameters the caller supplies (binding parameter excluded).
    #[must_use]
    pub fn call_parameters(&self) -> &[OperationParameter] {
        if self.is_bound && !self.parameters.is_empty() {
            &self.parameters[1..]
        } else {
            &self.parameters
        }
    }
}

///
/// Term
///

#[derive(Clone, Debug, PartialEq)]
pub struct Term {
    namespace: String,
    name: String,
    full_name: String,
    type_ref: TypeRef,
}

impl Term {
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, type_ref: TypeRef) -> Self {
        let namespace = namespace.into();
        let name = name.into();

        Self {
            full_name: format!("{namespace}.{name}"),
            namespace,
            name,
            type_ref,
        }
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    #[must_use]
    pub const fn type_ref(&self) -> &TypeRef {
        &self.type_ref
    }
}
