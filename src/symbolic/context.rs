//! Deployment-scope symbolic context.
//!
//! Builds the per-snapshot [`DeploymentMetadata`] (tenant, subscription,
//! resource group, deployment scope records) and the parameter bindings
//! handed to the expansion engine. Caller-supplied concrete values win;
//! everything else becomes a tagged [`SymbolicValue::Unresolved`]
//! placeholder. Derived composite fields (a tenant's fully-qualified id,
//! a resource group's id) are lazy concatenations over the placeholders,
//! so the unresolved marker threads through to the serialized form.
//!
//! Both results are built once per snapshot request and read-only
//! afterward; concurrent builds share nothing.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::symbolic::SymbolicValue;
use crate::template::Template;

/// Caller-supplied concrete scope values; any field left `None` is
/// synthesized as a placeholder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeploymentOverrides {
    /// Concrete tenant id, when known.
    pub tenant_id: Option<String>,
    /// Concrete subscription id, when known.
    pub subscription_id: Option<String>,
    /// Concrete resource group name, when known.
    pub resource_group: Option<String>,
    /// Concrete resource group location, when known.
    pub location: Option<String>,
    /// Concrete deployment name, when known.
    pub deployment_name: Option<String>,
}

/// Well-known fields of one deployment scope.
pub type ScopeRecord = IndexMap<String, SymbolicValue>;

/// Parameter name to bound value. Parameters left to their declared
/// defaults are absent; the expansion engine applies the default itself.
pub type ParameterBindings = IndexMap<String, SymbolicValue>;

/// Scope metadata for one snapshot build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentMetadata {
    /// Tenant scope fields.
    pub tenant: ScopeRecord,
    /// Subscription scope fields.
    pub subscription: ScopeRecord,
    /// Resource group scope fields.
    pub resource_group: ScopeRecord,
    /// Deployment scope fields.
    pub deployment: ScopeRecord,
}

fn concrete_or_placeholder(value: &Option<String>, kind: &str, key: &str) -> SymbolicValue {
    match value {
        Some(concrete) => SymbolicValue::string(concrete.clone()),
        None => SymbolicValue::unresolved(kind, key),
    }
}

/// Synthesizes resource-group-scoped deployment metadata from whatever
/// concrete values the caller could supply.
pub fn build_metadata(overrides: &DeploymentOverrides) -> DeploymentMetadata {
    let tenant_id = concrete_or_placeholder(&overrides.tenant_id, "tenant", "tenantId");
    let subscription_id =
        concrete_or_placeholder(&overrides.subscription_id, "subscription", "id");
    let resource_group =
        concrete_or_placeholder(&overrides.resource_group, "resourceGroup", "name");
    let location = concrete_or_placeholder(&overrides.location, "resourceGroup", "location");
    let deployment_name =
        concrete_or_placeholder(&overrides.deployment_name, "deployment", "name");

    let mut tenant = ScopeRecord::new();
    tenant.insert(
        "countryCode".to_string(),
        SymbolicValue::unresolved("tenant", "countryCode"),
    );
    tenant.insert(
        "displayName".to_string(),
        SymbolicValue::unresolved("tenant", "displayName"),
    );
    tenant.insert(
        "id".to_string(),
        SymbolicValue::concat(vec![SymbolicValue::string("/tenants/"), tenant_id.clone()]),
    );
    tenant.insert("tenantId".to_string(), tenant_id.clone());

    let mut subscription = ScopeRecord::new();
    subscription.insert(
        "id".to_string(),
        SymbolicValue::concat(vec![
            SymbolicValue::string("/subscriptions/"),
            subscription_id.clone(),
        ]),
    );
    subscription.insert("subscriptionId".to_string(), subscription_id.clone());
    subscription.insert("tenantId".to_string(), tenant_id);
    subscription.insert(
        "displayName".to_string(),
        SymbolicValue::unresolved("subscription", "displayName"),
    );

    let mut resource_group_record = ScopeRecord::new();
    resource_group_record.insert(
        "id".to_string(),
        SymbolicValue::concat(vec![
            SymbolicValue::string("/subscriptions/"),
            subscription_id,
            SymbolicValue::string("/resourceGroups/"),
            resource_group.clone(),
        ]),
    );
    resource_group_record.insert("name".to_string(), resource_group);
    resource_group_record.insert("location".to_string(), location);

    let mut deployment = ScopeRecord::new();
    deployment.insert("name".to_string(), deployment_name);

    DeploymentMetadata {
        tenant,
        subscription,
        resource_group: resource_group_record,
        deployment,
    }
}

/// Binds the template's declared parameters.
///
/// A caller-supplied concrete value binds as a literal. A parameter with a
/// declared default is left unbound for the engine to default. Anything
/// else binds to an `("parameter", <name>)` placeholder. Supplied values
/// for parameters the template does not declare are ignored.
pub fn bind_parameters(
    template: &Template,
    supplied: &IndexMap<String, Value>,
) -> ParameterBindings {
    let mut bindings = ParameterBindings::new();
    for (name, definition) in template.parameters() {
        if let Some(value) = supplied.get(name) {
            bindings.insert(name.clone(), SymbolicValue::literal(value.clone()));
        } else if definition.default_value.is_none() {
            bindings.insert(name.clone(), SymbolicValue::unresolved("parameter", name));
        }
    }
    bindings
}
