// src/services/variant_generator.rs

use std::collections::HashSet;

use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    models::product::{NewProduct, ProductAttributes},
};

/// Máximo de opções por dimensão no pedido.
pub const MAX_OPTIONS_PER_DIMENSION: u64 = 50;

/// Máximo de variantes geradas por lote (todas na mesma transação).
pub const MAX_VARIANTS: usize = 500;

/// Opções por dimensão. Dimensão vazia vira um único "sem valor".
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VariantOptions {
    #[serde(default)]
    #[validate(length(max = MAX_OPTIONS_PER_DIMENSION, message = "Opções de armazenamento demais."))]
    pub storage_ids: Vec<Uuid>,
    #[serde(default)]
    #[validate(length(max = MAX_OPTIONS_PER_DIMENSION, message = "Opções de memória demais."))]
    pub memory_ids: Vec<Uuid>,
    #[serde(default)]
    #[validate(length(max = MAX_OPTIONS_PER_DIMENSION, message = "Opções de cor demais."))]
    pub color_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VariantCombination {
    pub storage_id: Option<Uuid>,
    pub memory_id: Option<Uuid>,
    pub color_id: Option<Uuid>,
}

impl VariantCombination {
    pub fn into_new_product(self, base: &ProductAttributes) -> NewProduct {
        NewProduct {
            attributes: base.clone(),
            storage_id: self.storage_id,
            memory_id: self.memory_id,
            color_id: self.color_id,
        }
    }
}

/// Produto cartesiano armazenamento × memória × cor, nessa ordem de aninhamento.
/// Repetições dentro de uma dimensão são ignoradas (vale a primeira).
/// Lotes acima de `MAX_VARIANTS` são recusados antes de qualquer alocação.
pub fn expand_variants(options: &VariantOptions) -> Result<Vec<VariantCombination>, AppError> {
    let storages = dimension(&options.storage_ids);
    let memories = dimension(&options.memory_ids);
    let colors = dimension(&options.color_ids);

    let total = storages
        .len()
        .checked_mul(memories.len())
        .and_then(|n| n.checked_mul(colors.len()))
        .filter(|&n| n <= MAX_VARIANTS)
        .ok_or(AppError::TooManyVariants { max: MAX_VARIANTS })?;

    let mut combinations = Vec::with_capacity(total);
    for &storage_id in &storages {
        for &memory_id in &memories {
            for &color_id in &colors {
                combinations.push(VariantCombination { storage_id, memory_id, color_id });
            }
        }
    }
    Ok(combinations)
}

fn dimension(ids: &[Uuid]) -> Vec<Option<Uuid>> {
    let mut seen = HashSet::with_capacity(ids.len());
    let mut values: Vec<Option<Uuid>> = ids
        .iter()
        .filter(|id| seen.insert(**id))
        .map(|id| Some(*id))
        .collect();
    if values.is_empty() {
        values.push(None);
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn empty_dimension_is_represented_once() {
        let (a, b, x) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let options = VariantOptions {
            storage_ids: vec![a, b],
            memory_ids: vec![],
            color_ids: vec![x],
        };

        let combos = expand_variants(&options).unwrap();

        assert_eq!(
            combos,
            vec![
                VariantCombination { storage_id: Some(a), memory_id: None, color_id: Some(x) },
                VariantCombination { storage_id: Some(b), memory_id: None, color_id: Some(x) },
            ]
        );
    }

    #[test]
    fn no_options_yield_a_single_plain_product() {
        let combos = expand_variants(&VariantOptions::default()).unwrap();
        assert_eq!(
            combos,
            vec![VariantCombination { storage_id: None, memory_id: None, color_id: None }]
        );
    }

    #[test]
    fn repeated_options_are_collapsed() {
        let (a, x) = (Uuid::new_v4(), Uuid::new_v4());
        let options = VariantOptions {
            storage_ids: vec![a, a],
            memory_ids: vec![],
            color_ids: vec![x, x, x],
        };
        assert_eq!(expand_variants(&options).unwrap().len(), 1);
    }

    #[test]
    fn combination_carries_base_attributes() {
        let base = ProductAttributes {
            description: Some("Vitrine".into()),
            ..Default::default()
        };
        let storage = Uuid::new_v4();
        let new = VariantCombination { storage_id: Some(storage), memory_id: None, color_id: None }
            .into_new_product(&base);
        assert_eq!(new.storage_id, Some(storage));
        assert_eq!(new.attributes.description.as_deref(), Some("Vitrine"));
    }

    fn many(n: usize) -> Vec<Uuid> {
        (0..n as u128).map(Uuid::from_u128).collect()
    }

    #[test]
    fn huge_batches_are_refused_without_overflow() {
        let options = VariantOptions {
            storage_ids: many(3000),
            memory_ids: many(3000),
            color_ids: many(3000),
        };
        assert!(matches!(
            expand_variants(&options),
            Err(AppError::TooManyVariants { max: MAX_VARIANTS })
        ));
    }

    #[test]
    fn batch_ceiling_is_inclusive() {
        let at_limit = VariantOptions {
            storage_ids: many(50),
            memory_ids: many(10),
            color_ids: vec![],
        };
        assert_eq!(expand_variants(&at_limit).unwrap().len(), MAX_VARIANTS);

        let above = VariantOptions { color_ids: many(2), ..at_limit };
        assert!(expand_variants(&above).is_err());
    }

    #[test]
    fn option_lists_are_length_checked() {
        let options = VariantOptions { color_ids: many(51), ..Default::default() };
        let errors = options.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("color_ids"));
        assert!(VariantOptions { color_ids: many(50), ..Default::default() }.validate().is_ok());
    }

    fn ids(max: usize) -> impl Strategy<Value = Vec<Uuid>> {
        proptest::collection::vec(any::<u128>().prop_map(Uuid::from_u128), 0..max)
    }

    proptest! {
        #[test]
        fn count_is_product_of_non_empty_dimensions(s in ids(5), m in ids(5), c in ids(5)) {
            let options = VariantOptions { storage_ids: s.clone(), memory_ids: m.clone(), color_ids: c.clone() };
            let distinct = |v: &Vec<Uuid>| v.iter().collect::<HashSet<_>>().len().max(1);

            let combos = expand_variants(&options).unwrap();

            prop_assert_eq!(combos.len(), distinct(&s) * distinct(&m) * distinct(&c));
            let unique: HashSet<_> = combos.iter().collect();
            prop_assert_eq!(unique.len(), combos.len());
        }
    }
}
