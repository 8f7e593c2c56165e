use super::sources::SourcePlan;
use crate::abi::{get_entity_field_name, get_entity_name, AbiMap, Event};
use crate::config::{EntityRelationship, RelationType, SubgraphConfig};
use crate::error::Result;
use crate::templating::{TemplateRenderer, SCHEMA_TEMPLATE};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct Field {
    name: String,
    #[serde(rename = "type")]
    field_type: String,
    required: bool,
    derived_from: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
struct Entity {
    name: String,
    fields: Vec<Field>,
    /// Carries `from`/`to` instead of event parameters
    call: bool,
    /// Carries `hash`/`number`/`timestamp` instead of transaction metadata
    block: bool,
}

impl Entity {
    fn from_event(event: &Event) -> Self {
        let fields = event
            .params
            .iter()
            .map(|param| Field {
                name: get_entity_field_name(&param.name),
                field_type: param.graph_type.clone(),
                required: true,
                derived_from: None,
            })
            .collect();
        Self {
            name: get_entity_name(&event.name),
            fields,
            ..Default::default()
        }
    }
}

#[derive(Serialize)]
struct SchemaContext<'a> {
    subgraph_name: &'a str,
    network: &'a str,
    entities: Vec<Entity>,
}

/// Collects entities in emission order, skipping names already taken
#[derive(Default)]
struct EntitySet {
    entities: Vec<Entity>,
    seen: HashSet<String>,
}

impl EntitySet {
    fn push(&mut self, entity: Entity, source: &str) {
        if !self.seen.insert(entity.name.clone()) {
            warn!(
                "Entity {} from {} was already defined, skipping duplicate",
                entity.name, source
            );
            return;
        }
        self.entities.push(entity);
    }

    fn extend_from_plan(&mut self, plan: &SourcePlan) {
        for event in &plan.events {
            self.push(Entity::from_event(event), &plan.name);
        }
        for call in &plan.call_handlers {
            let entity = Entity {
                name: call.entity_name.clone(),
                call: true,
                ..Default::default()
            };
            self.push(entity, &plan.name);
        }
        if let Some(block) = &plan.block_handler {
            let entity = Entity {
                name: block.entity_name.clone(),
                block: true,
                ..Default::default()
            };
            self.push(entity, &plan.name);
        }
    }

    fn add_relationship(&mut self, relationship: &EntityRelationship) {
        let Some(entity) = self
            .entities
            .iter_mut()
            .find(|e| e.name == relationship.from_entity)
        else {
            warn!(
                "Entity '{}' not found for relationship to '{}'. Skipping relationship field.",
                relationship.from_entity, relationship.to_entity
            );
            return;
        };

        let field_type = match &relationship.relation_type {
            RelationType::OneToOne => relationship.to_entity.clone(),
            RelationType::OneToMany | RelationType::ManyToMany => {
                format!("[{}!]!", relationship.to_entity)
            }
            RelationType::Unknown(other) => {
                warn!(
                    "Unknown relation_type '{}' for relationship from '{}' to '{}'. Using one_to_one.",
                    other, relationship.from_entity, relationship.to_entity
                );
                relationship.to_entity.clone()
            }
        };

        entity.fields.push(Field {
            name: relationship.field_name.clone(),
            field_type,
            required: false,
            derived_from: relationship.derived_from.clone(),
        });
        debug!(
            "Added relationship field '{}' to entity '{}'",
            relationship.field_name, relationship.from_entity
        );
    }
}

/// Render `schema.graphql`: contract entities first (events, calls, block),
/// then template entities, then relationship fields
pub fn render_schema(config: &SubgraphConfig, abis: &AbiMap, renderer: &TemplateRenderer) -> Result<String> {
    info!("Rendering schema.graphql for: {}", config.name);
    let mut set = EntitySet::default();

    for contract in &config.contracts {
        let plan = SourcePlan::for_contract(contract, abis.get(&contract.name), config.complexity);
        set.extend_from_plan(&plan);
    }
    for template in config.active_templates() {
        let plan = SourcePlan::for_template(template, abis.get(&template.name));
        set.extend_from_plan(&plan);
    }
    for relationship in config.active_relationships() {
        set.add_relationship(relationship);
    }

    renderer.render(
        SCHEMA_TEMPLATE,
        &SchemaContext {
            subgraph_name: &config.name,
            network: &config.network,
            entities: set.entities,
        },
    )
}
