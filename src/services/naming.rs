// src/services/naming.rs

use crate::models::product::NamingAttributes;

/// Nome usado quando o produto não tem nenhum atributo que componha o nome.
pub const DEFAULT_PRODUCT_NAME: &str = "Produto sem nome";

/// Monta o nome de exibição a partir das relações resolvidas.
///
/// Ordem: marca, modelo, armazenamento, memória, cor, descrição.
/// Armazenamento e cor diretos têm prioridade sobre o texto legado do modelo;
/// nunca entram os dois.
pub fn compose_product_name(attrs: &NamingAttributes) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(6);

    push_text(&mut parts, attrs.brand.as_deref());
    push_text(&mut parts, attrs.model.as_deref());

    match attrs.storage_gb {
        Some(gb) => parts.push(format_capacity(gb)),
        None => push_text(&mut parts, attrs.model_storage.as_deref()),
    }

    if let Some(gb) = attrs.memory_gb {
        parts.push(format_capacity(gb));
    }

    match non_blank(attrs.color.as_deref()) {
        Some(color) => parts.push(color.to_string()),
        None => push_text(&mut parts, attrs.model_color.as_deref()),
    }

    push_text(&mut parts, attrs.description.as_deref());

    if parts.is_empty() {
        DEFAULT_PRODUCT_NAME.to_string()
    } else {
        parts.join(" ")
    }
}

fn format_capacity(gb: i32) -> String {
    format!("{gb}GB")
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn push_text(parts: &mut Vec<String>, value: Option<&str>) {
    if let Some(v) = non_blank(value) {
        parts.push(v.to_string());
    }
}
