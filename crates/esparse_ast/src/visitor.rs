//! AST traversal.
//!
//! `for_each_child` calls a closure on the direct children of a node in
//! source order; `children` collects them. Both hand out references with
//! the arena lifetime, so callers can keep them past the walk.

use crate::node::*;

/// Collect the direct children of `node` in source order.
pub fn children<'a>(node: &Node<'a>) -> Vec<&'a Node<'a>> {
    let mut out = Vec::new();
    for_each_child(node, &mut |child| out.push(child));
    out
}

fn each_in<'a>(list: &'a [Node<'a>], f: &mut dyn FnMut(&'a Node<'a>)) {
    for node in list {
        f(node);
    }
}

fn each_hole<'a>(list: &'a [Option<Node<'a>>], f: &mut dyn FnMut(&'a Node<'a>)) {
    for node in list.iter().flatten() {
        f(node);
    }
}

fn opt<'a>(node: OptionalNode<'a>, f: &mut dyn FnMut(&'a Node<'a>)) {
    if let Some(node) = node {
        f(node);
    }
}

fn each_function<'a>(func: &Function<'a>, f: &mut dyn FnMut(&'a Node<'a>)) {
    opt(func.id, f);
    opt(func.type_parameters, f);
    each_in(func.params, f);
    opt(func.return_type, f);
    f(func.body);
}

fn each_method<'a>(method: &Method<'a>, f: &mut dyn FnMut(&'a Node<'a>)) {
    each_in(method.decorators, f);
    f(method.key);
    each_function(&method.function, f);
}

fn each_class<'a>(class: &Class<'a>, f: &mut dyn FnMut(&'a Node<'a>)) {
    each_in(class.decorators, f);
    opt(class.id, f);
    opt(class.type_parameters, f);
    opt(class.super_class, f);
    opt(class.super_type_parameters, f);
    each_in(class.implements, f);
    f(class.body);
}

/// Call `f` on each direct child of `node`, in source order.
pub fn for_each_child<'a>(node: &Node<'a>, f: &mut dyn FnMut(&'a Node<'a>)) {
    use NodeKind::*;
    match &node.kind {
        Program { body, directives, .. } | BlockStatement { body, directives } => {
            each_in(directives, f);
            each_in(body, f);
        }
        Identifier { type_annotation, .. } => opt(*type_annotation, f),
        Directive { value } => f(value),

        ExpressionStatement { expression } => f(expression),
        WithStatement { object, body } => {
            f(object);
            f(body);
        }
        ReturnStatement { argument } => opt(*argument, f),
        LabeledStatement { label, body } => {
            f(label);
            f(body);
        }
        BreakStatement { label } | ContinueStatement { label } => opt(*label, f),
        IfStatement { test, consequent, alternate } => {
            f(test);
            f(consequent);
            opt(*alternate, f);
        }
        SwitchStatement { discriminant, cases } => {
            f(discriminant);
            each_in(cases, f);
        }
        SwitchCase { test, consequent } => {
            opt(*test, f);
            each_in(consequent, f);
        }
        ThrowStatement { argument } => f(argument),
        TryStatement { block, handler, finalizer } => {
            f(block);
            opt(*handler, f);
            opt(*finalizer, f);
        }
        CatchClause { param, body } => {
            f(param);
            f(body);
        }
        WhileStatement { test, body } => {
            f(test);
            f(body);
        }
        DoWhileStatement { body, test } => {
            f(body);
            f(test);
        }
        ForStatement { init, test, update, body } => {
            opt(*init, f);
            opt(*test, f);
            opt(*update, f);
            f(body);
        }
        ForInStatement { left, right, body }
        | ForOfStatement { left, right, body }
        | ForAwaitStatement { left, right, body } => {
            f(left);
            f(right);
            f(body);
        }

        FunctionDeclaration(func) | FunctionExpression(func) | ArrowFunctionExpression(func) => {
            each_function(func, f)
        }
        VariableDeclaration { declarations, .. } => each_in(declarations, f),
        VariableDeclarator { id, init } => {
            f(id);
            opt(*init, f);
        }
        ClassDeclaration(class) | ClassExpression(class) => each_class(class, f),
        ClassBody { body } => each_in(body, f),
        ClassMethod(method) | ObjectMethod(method) => each_method(method, f),
        ClassProperty {
            key,
            value,
            decorators,
            type_annotation,
            ..
        } => {
            each_in(decorators, f);
            f(key);
            opt(*type_annotation, f);
            opt(*value, f);
        }
        Decorator { expression } => f(expression),

        ImportDeclaration { specifiers, source, .. } => {
            each_in(specifiers, f);
            f(source);
        }
        ImportSpecifier { imported, local } => {
            f(imported);
            if local.start() != imported.start() {
                f(local);
            }
        }
        ImportDefaultSpecifier { local } | ImportNamespaceSpecifier { local } => f(local),
        ExportNamedDeclaration {
            declaration,
            specifiers,
            source,
            ..
        } => {
            opt(*declaration, f);
            each_in(specifiers, f);
            opt(*source, f);
        }
        ExportDefaultDeclaration { declaration } => f(declaration),
        ExportAllDeclaration { source } => f(source),
        ExportSpecifier { local, exported } => {
            f(local);
            if exported.start() != local.start() {
                f(exported);
            }
        }
        ExportDefaultSpecifier { exported } | ExportNamespaceSpecifier { exported } => f(exported),

        ArrayExpression { elements } => each_hole(elements, f),
        ArrayPattern { elements, type_annotation } => {
            each_hole(elements, f);
            opt(*type_annotation, f);
        }
        ObjectExpression { properties } => each_in(properties, f),
        ObjectPattern { properties, type_annotation } => {
            each_in(properties, f);
            opt(*type_annotation, f);
        }
        ObjectProperty {
            key,
            value,
            shorthand,
            decorators,
            ..
        } => {
            each_in(decorators, f);
            if *shorthand {
                f(value);
            } else {
                f(key);
                f(value);
            }
        }
        SpreadElement { argument } | SpreadProperty { argument } | RestProperty { argument } => f(argument),
        RestElement { argument, type_annotation } => {
            f(argument);
            opt(*type_annotation, f);
        }
        UnaryExpression { argument, .. } | UpdateExpression { argument, .. } => f(argument),
        BinaryExpression { left, right, .. }
        | LogicalExpression { left, right, .. }
        | AssignmentExpression { left, right, .. }
        | AssignmentPattern { left, right } => {
            f(left);
            f(right);
        }
        ConditionalExpression { test, consequent, alternate } => {
            f(test);
            f(consequent);
            f(alternate);
        }
        CallExpression { callee, arguments } | NewExpression { callee, arguments } => {
            f(callee);
            each_in(arguments, f);
        }
        SequenceExpression { expressions } => each_in(expressions, f),
        MemberExpression { object, property, .. } => {
            f(object);
            f(property);
        }
        TemplateLiteral { quasis, expressions } => {
            // Quasis and expressions interleave.
            let mut exprs = expressions.iter();
            for quasi in quasis.iter() {
                f(quasi);
                if let Some(expr) = exprs.next() {
                    f(expr);
                }
            }
        }
        TaggedTemplateExpression { tag, quasi } => {
            f(tag);
            f(quasi);
        }
        MetaProperty { meta, property } => {
            f(meta);
            f(property);
        }
        YieldExpression { argument, .. } => opt(*argument, f),
        AwaitExpression { argument } => f(argument),
        BindExpression { object, callee } => {
            opt(*object, f);
            f(callee);
        }
        DoExpression { body } => f(body),

        JsxNamespacedName { namespace, name } => {
            f(namespace);
            f(name);
        }
        JsxMemberExpression { object, property } => {
            f(object);
            f(property);
        }
        JsxExpressionContainer { expression } => f(expression),
        JsxSpreadAttribute { argument } => f(argument),
        JsxAttribute { name, value } => {
            f(name);
            opt(*value, f);
        }
        JsxOpeningElement { name, attributes, .. } => {
            f(name);
            each_in(attributes, f);
        }
        JsxClosingElement { name } => f(name),
        JsxElement {
            opening_element,
            closing_element,
            children,
        } => {
            f(opening_element);
            each_in(children, f);
            opt(*closing_element, f);
        }

        TypeAnnotation { type_annotation } | NullableTypeAnnotation { type_annotation } => f(type_annotation),
        TypeCastExpression {
            expression,
            type_annotation,
        } => {
            f(expression);
            f(type_annotation);
        }
        ArrayTypeAnnotation { element_type } => f(element_type),
        UnionTypeAnnotation { types } | IntersectionTypeAnnotation { types } | TupleTypeAnnotation { types } => {
            each_in(types, f)
        }
        TypeofTypeAnnotation { argument } => f(argument),
        GenericTypeAnnotation { id, type_parameters }
        | InterfaceExtends { id, type_parameters }
        | ClassImplements { id, type_parameters } => {
            f(id);
            opt(*type_parameters, f);
        }
        QualifiedTypeIdentifier { qualification, id } => {
            f(qualification);
            f(id);
        }
        FunctionTypeAnnotation {
            type_parameters,
            params,
            rest,
            return_type,
        } => {
            opt(*type_parameters, f);
            each_in(params, f);
            opt(*rest, f);
            f(return_type);
        }
        FunctionTypeParam { name, type_annotation, .. } => {
            opt(*name, f);
            f(type_annotation);
        }
        ObjectTypeAnnotation { properties, indexers, .. } => {
            let mut members: Vec<&'a Node<'a>> = properties.iter().chain(indexers.iter()).collect();
            members.sort_by_key(|member| member.start());
            for member in members {
                f(member);
            }
        }
        ObjectTypeProperty { key, value, method, .. } => {
            if !*method {
                f(key);
            }
            f(value);
        }
        ObjectTypeIndexer { id, key, value, .. } => {
            opt(*id, f);
            f(key);
            f(value);
        }
        TypeParameterDeclaration { params } | TypeParameterInstantiation { params } => each_in(params, f),
        TypeParameter { bound, default, .. } => {
            opt(*bound, f);
            opt(*default, f);
        }
        TypeAlias {
            id,
            type_parameters,
            right,
        } => {
            f(id);
            opt(*type_parameters, f);
            f(right);
        }
        InterfaceDeclaration {
            id,
            type_parameters,
            extends,
            body,
        }
        | DeclareClass {
            id,
            type_parameters,
            extends,
            body,
        } => {
            f(id);
            opt(*type_parameters, f);
            each_in(extends, f);
            f(body);
        }
        DeclareFunction { id } | DeclareVariable { id } => f(id),
        DeclareModule { id, body } => {
            f(id);
            f(body);
        }

        RegExpLiteral { .. }
        | NullLiteral
        | StringLiteral { .. }
        | BooleanLiteral { .. }
        | NumericLiteral { .. }
        | DirectiveLiteral { .. }
        | EmptyStatement
        | DebuggerStatement
        | ThisExpression
        | Super
        | TemplateElement { .. }
        | JsxIdentifier { .. }
        | JsxEmptyExpression
        | JsxText { .. }
        | AnyTypeAnnotation
        | MixedTypeAnnotation
        | EmptyTypeAnnotation
        | BooleanTypeAnnotation
        | NumberTypeAnnotation
        | StringTypeAnnotation
        | VoidTypeAnnotation
        | NullLiteralTypeAnnotation
        | ThisTypeAnnotation
        | StringLiteralTypeAnnotation { .. }
        | NumericLiteralTypeAnnotation { .. }
        | BooleanLiteralTypeAnnotation { .. } => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use esparse_core::text::SourceLocation;

    fn data<'a>(start: u32, end: u32) -> NodeData<'a> {
        NodeData::new(start, end, SourceLocation::default())
    }

    fn ident(name: &str, start: u32) -> Node<'_> {
        Node::new(
            NodeKind::Identifier {
                name,
                type_annotation: None,
                optional: false,
            },
            data(start, start + name.len() as u32),
        )
    }

    #[test]
    fn test_children_in_source_order() {
        let test = ident("a", 4);
        let cons = Node::new(NodeKind::EmptyStatement, data(7, 8));
        let alt = Node::new(NodeKind::EmptyStatement, data(14, 15));
        let stmt = Node::new(
            NodeKind::IfStatement {
                test: &test,
                consequent: &cons,
                alternate: Some(&alt),
            },
            data(0, 15),
        );
        let starts: Vec<u32> = children(&stmt).iter().map(|c| c.start()).collect();
        assert_eq!(starts, vec![4, 7, 14]);
    }

    #[test]
    fn test_for_each_child_skips_array_holes() {
        let elements = [Some(ident("x", 1)), None, Some(ident("y", 5))];
        let array = Node::new(NodeKind::ArrayExpression { elements: &elements }, data(0, 7));
        let mut names = Vec::new();
        for_each_child(&array, &mut |child| names.extend(child.identifier_name()));
        assert_eq!(names, vec!["x", "y"]);
    }
}
