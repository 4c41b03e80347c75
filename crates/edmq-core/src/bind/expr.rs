//! Expression binding for `$filter` and `$orderby`.

use crate::{
    bind::{
        BindContext, BindError,
        convert::{bind_literal, convert_to_type_if_needed},
        functions::{describe_arguments, is_canonical, select_overload},
        node::{
            BinaryOperatorNode, CollectionNavigationNode, CollectionNode,
            CollectionPropertyAccessNode, ConstantNode, ConvertNode, FunctionCallNode,
            OpenPropertyAccessNode, PropertyAccessNode, QueryNode, RangeVariableNode,
            ServiceOperationNode, SingleNavigationNode, SingleValueNode, UnaryOperatorNode,
        },
    },
    edm::{
        EntityType, Multiplicity, NavigationProperty, NavigationSource, PropertyRef,
        StructuredType, TypeRef,
    },
    semantics::{are_related, common_primitive_kind},
    syntax::token::{BinaryOperatorKind, LiteralToken, QueryToken, UnaryOperatorKind},
    value::LiteralValue,
};
use edmq_primitives::PrimitiveKind;
use std::sync::Arc;

///
/// ExpressionBinder
///
/// Binds one expression tree against the implicit range variable `$it`.
/// Nesting is bounded by `limit`.
///

pub struct ExpressionBinder<'m> {
    ctx: BindContext<'m>,
    range: RangeVariableNode,
    limit: usize,
    depth: usize,
}

impl<'m> ExpressionBinder<'m> {
    #[must_use]
    pub const fn new(ctx: BindContext<'m>, range: RangeVariableNode, limit: usize) -> Self {
        Self {
            ctx,
            range,
            limit,
            depth: 0,
        }
    }

    /// Range variable over the entities of `source`.
    #[must_use]
    pub fn for_source(ctx: BindContext<'m>, source: &NavigationSource, limit: usize) -> Self {
        Self::for_entity(ctx, source.entity_type(), Some(source.clone()), limit)
    }

    /// Range variable over `entity`, which may be derived from the
    /// source's element type after a cast.
    #[must_use]
    pub fn for_entity(
        ctx: BindContext<'m>,
        entity: &Arc<EntityType>,
        source: Option<NavigationSource>,
        limit: usize,
    ) -> Self {
        Self::new(ctx, range_over(entity, source), limit)
    }

    #[must_use]
    pub const fn range_variable(&self) -> &RangeVariableNode {
        &self.range
    }

    /// Bind a token that must produce a single value.
    pub fn bind_single(&mut self, token: &QueryToken) -> Result<SingleValueNode, BindError> {
        match self.bind(token)? {
            QueryNode::Single(node) => Ok(node),
            QueryNode::Collection(node) => Err(BindError::invalid_segment(
                &describe_token(token),
                &format!(
                    "collection of '{}' where a single value is expected",
                    node.type_ref().map_or_else(String::new, TypeRef::full_name)
                ),
            )),
        }
    }

    pub fn bind(&mut self, token: &QueryToken) -> Result<QueryNode, BindError> {
        self.enter()?;
        let bound = self.bind_token(token);
        self.depth -= 1;

        bound
    }

    fn enter(&mut self) -> Result<(), BindError> {
        if self.depth >= self.limit {
            return Err(BindError::RecursionLimitExceeded { limit: self.limit });
        }
        self.depth += 1;

        Ok(())
    }

    fn bind_token(&mut self, token: &QueryToken) -> Result<QueryNode, BindError> {
        match token {
            QueryToken::Literal(literal) => self.bind_constant(literal).map(QueryNode::Single),
            QueryToken::PropertyAccess { name, parent } => {
                self.bind_property_access(name, parent.as_deref())
            }
            QueryToken::FunctionCall {
                name,
                arguments,
                parent,
            } => self
                .bind_call(name, arguments, parent.as_deref())
                .map(QueryNode::Single),
            QueryToken::BinaryOperator { op, left, right } => self
                .bind_binary(*op, left, right)
                .map(QueryNode::Single),
            QueryToken::UnaryOperator { op, operand } => {
                self.bind_unary(*op, operand).map(QueryNode::Single)
            }
            QueryToken::Star { .. } => Err(BindError::invalid_segment(
                "*",
                "a wildcard is not an expression",
            )),
        }
    }

    //
    // literals
    //

    fn bind_constant(&self, literal: &LiteralToken) -> Result<SingleValueNode, BindError> {
        let constant = SingleValueNode::Constant(bind_literal(literal.clone()));

        // qualified enum literals are typed by their own prefix
        if let LiteralValue::Enum(value) = &literal.value
            && let Some(type_name) = &value.type_name
        {
            let schema_type = self.ctx.resolver.schema_type(type_name)?;
            let enum_type = schema_type
                .as_enum()
                .ok_or_else(|| BindError::UnresolvedType {
                    name: type_name.clone(),
                })?;
            let target = TypeRef::enumeration(enum_type, false);

            return convert_to_type_if_needed(constant, Some(&target), &self.ctx.resolver);
        }

        Ok(constant)
    }

    //
    // member access
    //

    fn bind_property_access(
        &mut self,
        name: &str,
        parent: Option<&QueryToken>,
    ) -> Result<QueryNode, BindError> {
        let source = match parent {
            None if name == RangeVariableNode::IMPLICIT_NAME => {
                return Ok(QueryNode::Single(SingleValueNode::RangeVariableReference(
                    self.range.clone(),
                )));
            }
            None => SingleValueNode::RangeVariableReference(self.range.clone()),
            Some(parent) => self.bind_single(parent)?,
        };

        let Some(owner) = source.type_ref().and_then(TypeRef::structured_definition) else {
            return Err(BindError::invalid_segment(
                name,
                "only entity and complex values have members",
            ));
        };

        if name.contains('.') {
            return self.bind_type_cast(source, &owner, name).map(QueryNode::Single);
        }

        match self.ctx.resolver.property(&owner, name)? {
            Some(PropertyRef::Structural(property)) => {
                Ok(property_access(source, property.name(), property.type_ref()))
            }
            Some(PropertyRef::Navigation(navigation)) => self.bind_navigation(source, navigation),
            None if owner.is_open() => Ok(QueryNode::Single(
                SingleValueNode::SingleValueOpenPropertyAccess(OpenPropertyAccessNode {
                    source: Box::new(source),
                    name: name.to_string(),
                }),
            )),
            None => Err(BindError::unresolved_property(name, owner.full_name())),
        }
    }

    fn bind_type_cast(
        &self,
        source: SingleValueNode,
        owner: &StructuredType,
        name: &str,
    ) -> Result<SingleValueNode, BindError> {
        let target = self.ctx.resolver.structured_type(name)?;
        if !are_related(owner, &target) {
            return Err(BindError::UnrelatedTypeCast {
                from: owner.full_name().to_string(),
                to: target.full_name().to_string(),
            });
        }

        let nullable = source.type_ref().is_none_or(TypeRef::is_nullable);
        Ok(SingleValueNode::Convert(ConvertNode {
            source: Box::new(source),
            type_ref: target.to_type_ref(nullable),
        }))
    }

    fn bind_navigation(
        &self,
        source: SingleValueNode,
        navigation: &NavigationProperty,
    ) -> Result<QueryNode, BindError> {
        let target = self.navigation_target(navigation)?;
        let navigation_source = source.navigation_source().and_then(|parent| {
            parent
                .navigation_target(navigation.name())
                .and_then(|name| self.ctx.model.find_navigation_source(name))
                .cloned()
        });

        if navigation.is_collection() {
            let type_ref = TypeRef::collection(TypeRef::entity(&target, false));
            Ok(QueryNode::Collection(CollectionNode::CollectionNavigation(
                CollectionNavigationNode {
                    source: Box::new(source),
                    navigation: navigation.name().to_string(),
                    target,
                    navigation_source,
                    type_ref,
                },
            )))
        } else {
            let nullable = navigation.multiplicity() != Multiplicity::One;
            let type_ref = TypeRef::entity(&target, nullable);
            Ok(QueryNode::Single(SingleValueNode::SingleNavigation(
                SingleNavigationNode {
                    source: Box::new(source),
                    navigation: navigation.name().to_string(),
                    target,
                    navigation_source,
                    type_ref,
                },
            )))
        }
    }

    fn navigation_target(&self, navigation: &NavigationProperty) -> Result<Arc<EntityType>, BindError> {
        self.ctx
            .model
            .find_entity_type(navigation.target())
            .cloned()
            .ok_or_else(|| BindError::UnresolvedType {
                name: navigation.target().to_string(),
            })
    }

    //
    // calls
    //

    fn bind_call(
        &mut self,
        name: &str,
        arguments: &[QueryToken],
        parent: Option<&QueryToken>,
    ) -> Result<SingleValueNode, BindError> {
        let mut bound = Vec::with_capacity(arguments.len());
        for argument in arguments {
            bound.push(self.bind_single(argument)?);
        }

        if parent.is_none() && is_canonical(name) {
            return match name {
                "isof" => self.bind_isof(bound),
                "cast" => self.bind_cast(bound),
                _ => self.bind_canonical(name, bound),
            };
        }

        if parent.is_some() || name.contains('.') {
            let binding = match parent {
                Some(parent) => self.bind_single(parent)?,
                None => SingleValueNode::RangeVariableReference(self.range.clone()),
            };
            return self.bind_bound_operation(name, binding, bound);
        }

        let imports = self.ctx.resolver.operation_imports(name)?;
        if imports.is_empty() {
            return Err(BindError::UnresolvedOperation {
                name: name.to_string(),
            });
        }
        self.bind_service_operation(name, &imports, bound)
    }

    fn bind_canonical(
        &self,
        name: &str,
        arguments: Vec<SingleValueNode>,
    ) -> Result<SingleValueNode, BindError> {
        let signature = select_overload(name, &arguments)?;

        let mut converted = Vec::with_capacity(arguments.len());
        for (argument, kind) in arguments.into_iter().zip(signature.parameters) {
            let target = TypeRef::primitive(*kind, true);
            converted.push(convert_to_type_if_needed(
                argument,
                Some(&target),
                &self.ctx.resolver,
            )?);
        }

        Ok(SingleValueNode::SingleValueFunctionCall(FunctionCallNode {
            name: name.to_string(),
            arguments: converted,
            type_ref: Some(TypeRef::primitive(signature.returns, true)),
        }))
    }

    /// `isof('NS.Type')` or `isof(expr, 'NS.Type')`.
    fn bind_isof(&self, arguments: Vec<SingleValueNode>) -> Result<SingleValueNode, BindError> {
        self.type_name_argument("isof", &arguments)?;

        Ok(SingleValueNode::SingleValueFunctionCall(FunctionCallNode {
            name: "isof".to_string(),
            arguments,
            type_ref: Some(TypeRef::primitive(PrimitiveKind::Boolean, false)),
        }))
    }

    /// `cast('NS.Type')` or `cast(expr, 'NS.Type')`; typed as the named type.
    fn bind_cast(&self, arguments: Vec<SingleValueNode>) -> Result<SingleValueNode, BindError> {
        let type_ref = self.type_name_argument("cast", &arguments)?;

        Ok(SingleValueNode::SingleValueFunctionCall(FunctionCallNode {
            name: "cast".to_string(),
            arguments,
            type_ref: Some(type_ref),
        }))
    }

    fn type_name_argument(
        &self,
        function: &str,
        arguments: &[SingleValueNode],
    ) -> Result<TypeRef, BindError> {
        let type_name = match arguments {
            [SingleValueNode::Constant(ConstantNode { value, .. })]
            | [_, SingleValueNode::Constant(ConstantNode { value, .. })] => value.as_str(),
            _ => None,
        };
        let Some(type_name) = type_name else {
            return Err(BindError::NoMatchingOverload {
                name: function.to_string(),
                arguments: describe_arguments(arguments),
            });
        };

        if let Some(kind) = PrimitiveKind::from_full_name(type_name) {
            return Ok(TypeRef::primitive(kind, true));
        }

        let schema_type = self.ctx.resolver.schema_type(type_name)?;
        match (schema_type.as_structured(), schema_type.as_enum()) {
            (Some(structured), _) => Ok(structured.to_type_ref(true)),
            (None, Some(enum_type)) => Ok(TypeRef::enumeration(enum_type, true)),
            (None, None) => Err(BindError::UnresolvedType {
                name: type_name.to_string(),
            }),
        }
    }

    fn bind_bound_operation(
        &self,
        name: &str,
        binding: SingleValueNode,
        arguments: Vec<SingleValueNode>,
    ) -> Result<SingleValueNode, BindError> {
        let owner = binding.type_ref().and_then(TypeRef::structured_definition);
        let candidates: Vec<_> = self
            .ctx
            .resolver
            .operations(name)?
            .into_iter()
            .filter(|op| op.is_bound() && op.call_parameters().len() == arguments.len())
            .filter(|op| {
                let bound_to = op
                    .binding_parameter()
                    .and_then(|p| p.type_ref().structured_definition());
                match (&owner, bound_to) {
                    (Some(owner), Some(bound_to)) => are_related(owner, &bound_to),
                    _ => false,
                }
            })
            .collect();

        let operation = match candidates.as_slice() {
            [] => {
                return Err(BindError::UnresolvedOperation {
                    name: name.to_string(),
                });
            }
            [only] => Arc::clone(only),
            _ => {
                return Err(BindError::AmbiguousOverload {
                    name: name.to_string(),
                });
            }
        };

        let mut converted = vec![binding];
        for (argument, parameter) in arguments.into_iter().zip(operation.call_parameters()) {
            converted.push(convert_to_type_if_needed(
                argument,
                Some(parameter.type_ref()),
                &self.ctx.resolver,
            )?);
        }

        Ok(SingleValueNode::SingleValueFunctionCall(FunctionCallNode {
            name: operation.full_name().to_string(),
            arguments: converted,
            type_ref: operation.return_type().cloned(),
        }))
    }

    fn bind_service_operation(
        &self,
        name: &str,
        imports: &[Arc<crate::edm::OperationImport>],
        arguments: Vec<SingleValueNode>,
    ) -> Result<SingleValueNode, BindError> {
        let candidates: Vec<_> = imports
            .iter()
            .filter(|import| import.operation().call_parameters().len() == arguments.len())
            .collect();

        let import = match candidates.as_slice() {
            [] => {
                return Err(BindError::NoMatchingOverload {
                    name: name.to_string(),
                    arguments: describe_arguments(&arguments),
                });
            }
            [only] => Arc::clone(only),
            _ => {
                return Err(BindError::AmbiguousOverload {
                    name: name.to_string(),
                });
            }
        };

        let type_ref = import.operation().return_type().cloned();
        if type_ref.as_ref().is_some_and(TypeRef::is_collection) {
            return Err(BindError::invalid_segment(
                name,
                "a collection-valued import cannot be used as a single value",
            ));
        }

        let mut converted = Vec::with_capacity(arguments.len());
        for (argument, parameter) in arguments
            .into_iter()
            .zip(import.operation().call_parameters())
        {
            converted.push(convert_to_type_if_needed(
                argument,
                Some(parameter.type_ref()),
                &self.ctx.resolver,
            )?);
        }

        Ok(SingleValueNode::SingleValueServiceOperation(
            ServiceOperationNode {
                import,
                arguments: converted,
                type_ref,
            },
        ))
    }

    //
    // operators
    //

    fn bind_binary(
        &mut self,
        op: BinaryOperatorKind,
        left: &QueryToken,
        right: &QueryToken,
    ) -> Result<SingleValueNode, BindError> {
        let left = self.bind_single(left)?;
        let right = self.bind_single(right)?;

        let (left, right, type_ref) = if op.is_logical() {
            let left = self.require_boolean(op.keyword(), left)?;
            let right = self.require_boolean(op.keyword(), right)?;
            (left, right, Some(boolean(true)))
        } else if op == BinaryOperatorKind::Has {
            self.bind_has(left, right)?
        } else {
            let (left, right, operand_type) = self.promote_operands(op, left, right)?;
            let type_ref = if op.is_arithmetic() {
                if let Some(operand_type) = &operand_type
                    && !operand_type.is_numeric()
                {
                    return Err(BindError::IncompatibleOperandTypes {
                        op: op.keyword().to_string(),
                        left: operand_type.full_name(),
                        right: operand_type.full_name(),
                    });
                }
                operand_type
            } else {
                let nullable = operand_type.as_ref().is_none_or(TypeRef::is_nullable);
                Some(boolean(nullable))
            };
            (left, right, type_ref)
        };

        Ok(SingleValueNode::BinaryOperator(BinaryOperatorNode {
            op,
            left: Box::new(left),
            right: Box::new(right),
            type_ref,
        }))
    }

    /// `enum has flag`: the right side converts to the left side's enum.
    fn bind_has(
        &self,
        left: SingleValueNode,
        right: SingleValueNode,
    ) -> Result<(SingleValueNode, SingleValueNode, Option<TypeRef>), BindError> {
        let Some(enum_type) = left.type_ref().filter(|t| t.is_enum()).cloned() else {
            return Err(BindError::IncompatibleOperandTypes {
                op: BinaryOperatorKind::Has.keyword().to_string(),
                left: type_name(&left),
                right: type_name(&right),
            });
        };

        let right = convert_to_type_if_needed(right, Some(&enum_type), &self.ctx.resolver)?;
        Ok((left, right, Some(boolean(false))))
    }

    /// Bring both operands to one type. Returns the shared type, `None`
    /// when both sides are untyped.
    fn promote_operands(
        &self,
        op: BinaryOperatorKind,
        left: SingleValueNode,
        right: SingleValueNode,
    ) -> Result<(SingleValueNode, SingleValueNode, Option<TypeRef>), BindError> {
        let resolver = &self.ctx.resolver;

        let (left_type, right_type) = match (left.type_ref().cloned(), right.type_ref().cloned()) {
            (None, None) => return Ok((left, right, None)),
            // null and dynamic values adopt the other side's type
            (None, Some(right_type)) => {
                let target = right_type.with_nullable(true);
                let left = convert_to_type_if_needed(left, Some(&target), resolver)?;
                return Ok((left, right, Some(target)));
            }
            (Some(left_type), None) => {
                let target = left_type.with_nullable(true);
                let right = convert_to_type_if_needed(right, Some(&target), resolver)?;
                return Ok((left, right, Some(target)));
            }
            (Some(left_type), Some(right_type)) => (left_type, right_type),
        };

        if left_type.is_definition_equivalent(&right_type) {
            let nullable = left_type.is_nullable() || right_type.is_nullable();
            return Ok((left, right, Some(left_type.with_nullable(nullable))));
        }

        // enum operands take literals written as names or numbers
        if left_type.is_enum() {
            let right = convert_to_type_if_needed(right, Some(&left_type), resolver)?;
            return Ok((left, right, Some(left_type)));
        }
        if right_type.is_enum() {
            let left = convert_to_type_if_needed(left, Some(&right_type), resolver)?;
            return Ok((left, right, Some(right_type)));
        }

        let incompatible = || BindError::IncompatibleOperandTypes {
            op: op.keyword().to_string(),
            left: left_type.full_name(),
            right: right_type.full_name(),
        };
        if !left_type.is_primitive() || !right_type.is_primitive() {
            return Err(incompatible());
        }

        let common = common_primitive_kind(left_type.primitive_kind(), right_type.primitive_kind())
            .ok_or_else(incompatible)?;
        let nullable = left_type.is_nullable() || right_type.is_nullable();
        let target = TypeRef::primitive(common, nullable);

        let left = convert_to_type_if_needed(left, Some(&target), resolver)?;
        let right = convert_to_type_if_needed(right, Some(&target), resolver)?;
        Ok((left, right, Some(target)))
    }

    fn bind_unary(
        &mut self,
        op: UnaryOperatorKind,
        operand: &QueryToken,
    ) -> Result<SingleValueNode, BindError> {
        let operand = self.bind_single(operand)?;

        let (operand, type_ref) = match op {
            UnaryOperatorKind::Not => {
                let operand = self.require_boolean("not", operand)?;
                let nullable = operand.type_ref().is_none_or(TypeRef::is_nullable);
                (operand, Some(boolean(nullable)))
            }
            UnaryOperatorKind::Negate => {
                let type_ref = operand.type_ref().cloned();
                if let Some(type_ref) = &type_ref
                    && !type_ref.is_numeric()
                {
                    return Err(BindError::NonNumericOperand {
                        context: op.to_string(),
                        found: type_ref.full_name(),
                    });
                }
                (operand, type_ref)
            }
        };

        Ok(SingleValueNode::UnaryOperator(UnaryOperatorNode {
            op,
            operand: Box::new(operand),
            type_ref,
        }))
    }

    fn require_boolean(
        &self,
        context: &str,
        node: SingleValueNode,
    ) -> Result<SingleValueNode, BindError> {
        match node.type_ref() {
            None => convert_to_type_if_needed(node, Some(&boolean(true)), &self.ctx.resolver),
            Some(type_ref) if type_ref.is_boolean() => Ok(node),
            Some(type_ref) => Err(BindError::NonBooleanOperand {
                context: context.to_string(),
                found: type_ref.full_name(),
            }),
        }
    }
}

/// Implicit `$it` over an entity type.
pub(crate) fn range_over(
    entity: &Arc<EntityType>,
    navigation_source: Option<NavigationSource>,
) -> RangeVariableNode {
    RangeVariableNode {
        name: RangeVariableNode::IMPLICIT_NAME.to_string(),
        type_ref: TypeRef::entity(entity, false),
        navigation_source,
    }
}

fn property_access(source: SingleValueNode, name: &str, type_ref: &TypeRef) -> QueryNode {
    let source = Box::new(source);
    let property = name.to_string();
    let type_ref = type_ref.clone();

    if type_ref.is_collection() {
        QueryNode::Collection(CollectionNode::CollectionPropertyAccess(
            CollectionPropertyAccessNode {
                source,
                property,
                type_ref,
            },
        ))
    } else {
        QueryNode::Single(SingleValueNode::SingleValuePropertyAccess(
            PropertyAccessNode {
                source,
                property,
                type_ref,
            },
        ))
    }
}

const fn boolean(nullable: bool) -> TypeRef {
    TypeRef::primitive(PrimitiveKind::Boolean, nullable)
}

fn type_name(node: &SingleValueNode) -> String {
    node.type_ref()
        .map_or_else(|| "null".to_string(), TypeRef::full_name)
}

/// Short source form of a token for error messages.
fn describe_token(token: &QueryToken) -> String {
    match token {
        QueryToken::PropertyAccess { name, .. } | QueryToken::FunctionCall { name, .. } => {
            name.clone()
        }
        QueryToken::Literal(literal) => literal.text.clone(),
        QueryToken::BinaryOperator { op, .. } => op.keyword().to_string(),
        QueryToken::UnaryOperator { op, .. } => op.to_string(),
        QueryToken::Star { .. } => "*".to_string(),
    }
}
