//! Permit2 struct type graph
//!
//! Builds the `types` object of the typed-data payload. The plain graph is
//! fixed; the witness graph appends one caller-described field to the permit
//! and merges the structs it needs, keeping only what the primary type
//! actually reaches.

use super::types::WitnessSpec;
use crate::eip712::{self, get_base_type, is_primitive_type, Eip712Error, TypedDataField, Types};
use crate::error::ValidationError;
use crate::log_warn;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeSet;

pub const PERMIT_TRANSFER_FROM: &str = "PermitTransferFrom";
pub const PERMIT_WITNESS_TRANSFER_FROM: &str = "PermitWitnessTransferFrom";
pub const TOKEN_PERMISSIONS: &str = "TokenPermissions";

/// Field names of the permit itself; a witness may not reuse them
pub const RESERVED_FIELD_NAMES: [&str; 4] = ["permitted", "spender", "nonce", "deadline"];

/// `TokenPermissions` fields in declaration order
pub fn token_permissions_type() -> Vec<TypedDataField> {
    vec![
        TypedDataField::new("token", "address"),
        TypedDataField::new("amount", "uint256"),
    ]
}

/// `PermitTransferFrom` fields in declaration order
pub fn transfer_fields() -> Vec<TypedDataField> {
    vec![
        TypedDataField::new("permitted", TOKEN_PERMISSIONS),
        TypedDataField::new("spender", "address"),
        TypedDataField::new("nonce", "uint256"),
        TypedDataField::new("deadline", "uint256"),
    ]
}

/// Resolved, acyclic set of struct definitions with a designated primary type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeGraph {
    primary_type: String,
    structs: Types,
}

impl TypeGraph {
    pub fn primary_type(&self) -> &str {
        &self.primary_type
    }

    pub fn primary_fields(&self) -> &[TypedDataField] {
        self.get(&self.primary_type).unwrap_or(&[])
    }

    pub fn get(&self, type_name: &str) -> Option<&[TypedDataField]> {
        self.structs.get(type_name).map(Vec::as_slice)
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.structs.contains_key(type_name)
    }

    pub fn len(&self) -> usize {
        self.structs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.structs.is_empty()
    }

    /// Structs in payload order: the primary type, then the rest alphabetically
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[TypedDataField])> + '_ {
        let primary = self
            .structs
            .get_key_value(&self.primary_type)
            .map(|(name, fields)| (name.as_str(), fields.as_slice()));

        primary.into_iter().chain(
            self.structs
                .iter()
                .filter(move |(name, _)| **name != self.primary_type)
                .map(|(name, fields)| (name.as_str(), fields.as_slice())),
        )
    }

    pub fn type_names(&self) -> Vec<&str> {
        self.iter().map(|(name, _)| name).collect()
    }

    /// Underlying name → fields map, alphabetically keyed
    pub fn structs(&self) -> &Types {
        &self.structs
    }

    /// Canonical EIP-712 type string of the primary type
    pub fn encode_type(&self) -> Result<String, Eip712Error> {
        eip712::encode_type(&self.primary_type, &self.structs)
    }
}

impl Serialize for TypeGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.structs.len()))?;
        for (name, fields) in self.iter() {
            map.serialize_entry(name, fields)?;
        }
        map.end()
    }
}

/// Type graph for `PermitTransferFrom`
pub fn build_plain_type_graph() -> TypeGraph {
    let mut structs = Types::new();
    structs.insert(PERMIT_TRANSFER_FROM.to_string(), transfer_fields());
    structs.insert(TOKEN_PERMISSIONS.to_string(), token_permissions_type());

    TypeGraph {
        primary_type: PERMIT_TRANSFER_FROM.to_string(),
        structs,
    }
}

/// Type graph for `PermitWitnessTransferFrom` with the witness field appended last
pub fn build_witness_type_graph(spec: &WitnessSpec) -> Result<TypeGraph, ValidationError> {
    let witness_field = &spec.witness_field;
    if RESERVED_FIELD_NAMES.contains(&witness_field.name.as_str()) {
        return Err(ValidationError::ReservedFieldName(witness_field.name.clone()));
    }

    let witness_base = get_base_type(&witness_field.type_name);
    if !is_primitive_type(witness_base) && spec.witness_sub_types.is_none() {
        return Err(ValidationError::MissingWitnessSubTypes(
            witness_field.type_name.clone(),
        ));
    }

    let mut primary = transfer_fields();
    primary.push(witness_field.clone());

    let mut candidates = Types::new();
    candidates.insert(PERMIT_WITNESS_TRANSFER_FROM.to_string(), primary);
    candidates.insert(TOKEN_PERMISSIONS.to_string(), token_permissions_type());

    if let Some(sub_types) = &spec.witness_sub_types {
        for (name, fields) in sub_types {
            if candidates.contains_key(name) {
                return Err(ValidationError::ReservedTypeName(name.clone()));
            }
            candidates.insert(name.clone(), fields.clone());
        }
    }

    let reachable = resolve(PERMIT_WITNESS_TRANSFER_FROM, &candidates)?;

    // Unreferenced sub-types are dropped below but must still be well formed.
    let mut checked = reachable.clone();
    for name in candidates.keys() {
        if !checked.contains(name) {
            visit(name, &candidates, &mut Vec::new(), &mut checked)?;
        }
    }

    let mut structs = Types::new();
    for (name, fields) in candidates {
        if reachable.contains(&name) {
            structs.insert(name, fields);
        } else {
            log_warn!("type_graph", "dropping unreferenced witness sub-type", type_name = name);
        }
    }

    Ok(TypeGraph {
        primary_type: PERMIT_WITNESS_TRANSFER_FROM.to_string(),
        structs,
    })
}

/// Depth-first walk from `root`; returns every struct it reaches.
fn resolve(root: &str, candidates: &Types) -> Result<BTreeSet<String>, ValidationError> {
    let mut done = BTreeSet::new();
    let mut path = Vec::new();
    visit(root, candidates, &mut path, &mut done)?;
    Ok(done)
}

fn visit(
    name: &str,
    candidates: &Types,
    path: &mut Vec<String>,
    done: &mut BTreeSet<String>,
) -> Result<(), ValidationError> {
    path.push(name.to_string());

    for field in candidates.get(name).map(Vec::as_slice).unwrap_or(&[]) {
        let base = get_base_type(&field.type_name);
        if is_primitive_type(base) {
            continue;
        }
        if !candidates.contains_key(base) {
            return Err(ValidationError::UndefinedType {
                type_name: base.to_string(),
                referenced_by: format!("{}.{}", name, field.name),
            });
        }
        if let Some(start) = path.iter().position(|seen| seen == base) {
            let mut cycle = path[start..].to_vec();
            cycle.push(base.to_string());
            return Err(ValidationError::RecursiveType(cycle.join(" -> ")));
        }
        if !done.contains(base) {
            visit(base, candidates, path, done)?;
        }
    }

    path.pop();
    done.insert(name.to_string());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sub_types(entries: Vec<(&str, Vec<(&str, &str)>)>) -> Types {
        entries
            .into_iter()
            .map(|(name, fields)| {
                (
                    name.to_string(),
                    fields
                        .into_iter()
                        .map(|(field, ty)| TypedDataField::new(field, ty))
                        .collect(),
                )
            })
            .collect()
    }

    fn witness(field: &str, ty: &str, types: Option<Types>) -> WitnessSpec {
        WitnessSpec::new(TypedDataField::new(field, ty), types)
    }

    #[test]
    fn test_plain_graph_layout() {
        let graph = build_plain_type_graph();
        assert_eq!(graph.primary_type(), "PermitTransferFrom");
        assert_eq!(graph.type_names(), vec!["PermitTransferFrom", "TokenPermissions"]);
        assert_eq!(graph.primary_fields(), transfer_fields().as_slice());
        assert_eq!(graph.get("TokenPermissions"), Some(token_permissions_type().as_slice()));
    }

    #[test]
    fn test_plain_graph_encode_type() {
        assert_eq!(
            build_plain_type_graph().encode_type().unwrap(),
            "PermitTransferFrom(TokenPermissions permitted,address spender,\
             uint256 nonce,uint256 deadline)\
             TokenPermissions(address token,uint256 amount)"
        );
    }

    #[test]
    fn test_witness_field_is_last() {
        let spec = witness(
            "witness",
            "Witness",
            Some(sub_types(vec![("Witness", vec![("user", "address")])])),
        );
        let graph = build_witness_type_graph(&spec).unwrap();

        let names: Vec<&str> = graph.primary_fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["permitted", "spender", "nonce", "deadline", "witness"]);
        assert_eq!(
            graph.type_names(),
            vec!["PermitWitnessTransferFrom", "TokenPermissions", "Witness"]
        );
        assert_eq!(
            graph.encode_type().unwrap(),
            "PermitWitnessTransferFrom(TokenPermissions permitted,address spender,\
             uint256 nonce,uint256 deadline,Witness witness)\
             TokenPermissions(address token,uint256 amount)Witness(address user)"
        );
    }

    #[test]
    fn test_primitive_witness_needs_no_sub_types() {
        let graph = build_witness_type_graph(&witness("orderHash", "bytes32", None)).unwrap();
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.primary_fields()[4], TypedDataField::new("orderHash", "bytes32"));

        let graph = build_witness_type_graph(&witness("ids", "uint256[]", None)).unwrap();
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn test_struct_witness_without_sub_types_fails() {
        let result = build_witness_type_graph(&witness("witness", "Witness", None));
        assert_eq!(
            result,
            Err(ValidationError::MissingWitnessSubTypes("Witness".to_string()))
        );

        let result = build_witness_type_graph(&witness("orders", "Order[]", None));
        assert!(matches!(result, Err(ValidationError::MissingWitnessSubTypes(_))));
    }

    #[test]
    fn test_nested_sub_types_sorted_after_primary() {
        let spec = witness(
            "witness",
            "ExclusiveOrder",
            Some(sub_types(vec![
                ("ExclusiveOrder", vec![("info", "OrderInfo"), ("outputs", "Output[]")]),
                ("OrderInfo", vec![("reactor", "address"), ("deadline", "uint256")]),
                ("Output", vec![("token", "address"), ("amount", "uint256")]),
            ])),
        );
        let graph = build_witness_type_graph(&spec).unwrap();

        assert_eq!(
            graph.type_names(),
            vec![
                "PermitWitnessTransferFrom",
                "ExclusiveOrder",
                "OrderInfo",
                "Output",
                "TokenPermissions"
            ]
        );
    }

    #[test]
    fn test_direct_self_reference_fails() {
        let spec = witness(
            "witness",
            "Node",
            Some(sub_types(vec![("Node", vec![("next", "Node")])])),
        );
        assert!(matches!(
            build_witness_type_graph(&spec),
            Err(ValidationError::RecursiveType(_))
        ));
    }

    #[test]
    fn test_self_reference_through_array_fails() {
        let spec = witness(
            "witness",
            "Tree",
            Some(sub_types(vec![("Tree", vec![("children", "Tree[]")])])),
        );
        assert!(matches!(
            build_witness_type_graph(&spec),
            Err(ValidationError::RecursiveType(_))
        ));
    }

    #[test]
    fn test_transitive_cycle_reports_path() {
        let spec = witness(
            "witness",
            "A",
            Some(sub_types(vec![("A", vec![("b", "B")]), ("B", vec![("a", "A")])])),
        );
        assert_eq!(
            build_witness_type_graph(&spec),
            Err(ValidationError::RecursiveType("A -> B -> A".to_string()))
        );
    }

    #[test]
    fn test_shared_dependency_is_not_a_cycle() {
        let spec = witness(
            "witness",
            "Pair",
            Some(sub_types(vec![
                ("Pair", vec![("left", "Leg"), ("right", "Leg")]),
                ("Leg", vec![("token", "address")]),
            ])),
        );
        let graph = build_witness_type_graph(&spec).unwrap();
        assert!(graph.contains("Leg"));
        assert!(graph.contains("Pair"));
    }

    #[test]
    fn test_undefined_reference_fails() {
        let spec = witness(
            "witness",
            "Witness",
            Some(sub_types(vec![("Witness", vec![("order", "Order")])])),
        );
        assert_eq!(
            build_witness_type_graph(&spec),
            Err(ValidationError::UndefinedType {
                type_name: "Order".to_string(),
                referenced_by: "Witness.order".to_string(),
            })
        );
    }

    #[test]
    fn test_unreachable_sub_types_are_dropped() {
        let spec = witness(
            "witness",
            "Witness",
            Some(sub_types(vec![
                ("Witness", vec![("user", "address")]),
                ("Unused", vec![("x", "uint256")]),
            ])),
        );
        let graph = build_witness_type_graph(&spec).unwrap();
        assert!(!graph.contains("Unused"));
        assert_eq!(graph.len(), 3);
    }

    #[test]
    fn test_unreachable_self_reference_fails() {
        let spec = witness(
            "witness",
            "Witness",
            Some(sub_types(vec![
                ("Witness", vec![("user", "address")]),
                ("Node", vec![("next", "Node")]),
            ])),
        );
        assert_eq!(
            build_witness_type_graph(&spec),
            Err(ValidationError::RecursiveType("Node -> Node".to_string()))
        );
    }

    #[test]
    fn test_unreachable_transitive_cycle_fails() {
        let spec = witness(
            "witness",
            "Witness",
            Some(sub_types(vec![
                ("Witness", vec![("user", "address")]),
                ("A", vec![("b", "B")]),
                ("B", vec![("a", "A")]),
            ])),
        );
        assert_eq!(
            build_witness_type_graph(&spec),
            Err(ValidationError::RecursiveType("A -> B -> A".to_string()))
        );
    }

    #[test]
    fn test_unreachable_undefined_reference_fails() {
        let spec = witness(
            "witness",
            "Witness",
            Some(sub_types(vec![
                ("Witness", vec![("user", "address")]),
                ("Orphan", vec![("order", "Order[]")]),
            ])),
        );
        assert_eq!(
            build_witness_type_graph(&spec),
            Err(ValidationError::UndefinedType {
                type_name: "Order".to_string(),
                referenced_by: "Orphan.order".to_string(),
            })
        );
    }

    #[test]
    fn test_reserved_names_rejected() {
        let spec = witness("nonce", "uint256", None);
        assert_eq!(
            build_witness_type_graph(&spec),
            Err(ValidationError::ReservedFieldName("nonce".to_string()))
        );

        let spec = witness(
            "witness",
            "Witness",
            Some(sub_types(vec![
                ("Witness", vec![("user", "address")]),
                ("TokenPermissions", vec![("token", "address")]),
            ])),
        );
        assert_eq!(
            build_witness_type_graph(&spec),
            Err(ValidationError::ReservedTypeName("TokenPermissions".to_string()))
        );
    }

    #[test]
    fn test_serializes_primary_first() {
        let spec = witness(
            "witness",
            "AWitness",
            Some(sub_types(vec![("AWitness", vec![("user", "address")])])),
        );
        let graph = build_witness_type_graph(&spec).unwrap();
        let json = serde_json::to_string(&graph).unwrap();

        let primary = json.find("PermitWitnessTransferFrom").unwrap();
        let witness_type = json.find("\"AWitness\":").unwrap();
        assert!(primary < witness_type);
        assert!(json.contains(r#"{"name":"user","type":"address"}"#));
    }
}
