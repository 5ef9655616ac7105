//! Add-on candidate resolution.
//!
//! Given a base product's category and a snapshot of category-linked
//! attributes, add-on products and their option tags, derive which add-ons
//! can be offered alongside the base product. A product qualifies when it is
//! tagged with an option scoped to the base product's category; the result
//! is grouped per attribute and option so an operator can see *why* each
//! add-on matched.
//!
//! Everything in this module is a pure function of its inputs. Callers pass
//! attributes in display order, options in display order within their
//! attribute, and tags in insertion order; the resolver preserves those
//! orders, so repeated calls over an unchanged snapshot produce identical
//! output.

use std::collections::HashMap;

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct OptionView {
    pub id: Uuid,
    pub name: String,
}

/// How an attribute scopes its options. Category-linked attributes partition
/// options by category; an option of such an attribute that carries no
/// category never enters the map and therefore can never match. Global
/// attributes have no category axis at all and contribute no candidates.
#[derive(Debug, Clone)]
pub enum AttributeKind {
    CategoryLinked(HashMap<Uuid, Vec<OptionView>>),
    Global(Vec<OptionView>),
}

impl AttributeKind {
    pub fn category_linked<I>(options: I) -> Self
    where
        I: IntoIterator<Item = (Option<Uuid>, OptionView)>,
    {
        let mut by_category: HashMap<Uuid, Vec<OptionView>> = HashMap::new();
        for (category_id, option) in options {
            if let Some(category_id) = category_id {
                by_category.entry(category_id).or_default().push(option);
            }
        }
        AttributeKind::CategoryLinked(by_category)
    }
}

#[derive(Debug, Clone)]
pub struct AttributeView {
    pub id: Uuid,
    pub name: String,
    pub kind: AttributeKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AddonProduct {
    pub id: Uuid,
    pub title: String,
}

/// A (product, option) tag edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionTag {
    pub product_id: Uuid,
    pub option_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct OptionCandidates {
    pub option_id: Uuid,
    pub option_name: String,
    pub addons: Vec<AddonProduct>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AttributeCandidates {
    pub attribute_id: Uuid,
    pub attribute_name: String,
    pub options: Vec<OptionCandidates>,
}

/// Resolve the derived add-on candidate set for a base category.
///
/// Options with no tagged add-on are dropped, and attributes left with no
/// options are dropped entirely, so the output only contains groups the
/// operator can act on.
pub fn resolve_addon_candidates(
    base_category_id: Uuid,
    attributes: &[AttributeView],
    addons: &[AddonProduct],
    tags: &[OptionTag],
) -> Vec<AttributeCandidates> {
    let addons_by_id: HashMap<Uuid, &AddonProduct> =
        addons.iter().map(|addon| (addon.id, addon)).collect();

    let mut groups = Vec::new();

    for attribute in attributes {
        let options = match &attribute.kind {
            AttributeKind::CategoryLinked(by_category) => {
                match by_category.get(&base_category_id) {
                    Some(options) => options.as_slice(),
                    None => continue,
                }
            }
            AttributeKind::Global(_) => continue,
        };

        let mut option_groups = Vec::new();
        for option in options {
            let matched: Vec<AddonProduct> = tags
                .iter()
                .filter(|tag| tag.option_id == option.id)
                .filter_map(|tag| addons_by_id.get(&tag.product_id))
                .map(|addon| (*addon).clone())
                .collect();

            if matched.is_empty() {
                continue;
            }

            option_groups.push(OptionCandidates {
                option_id: option.id,
                option_name: option.name.clone(),
                addons: matched,
            });
        }

        if option_groups.is_empty() {
            continue;
        }

        groups.push(AttributeCandidates {
            attribute_id: attribute.id,
            attribute_name: attribute.name.clone(),
            options: option_groups,
        });
    }

    groups
}
