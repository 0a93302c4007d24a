//! Demo content for a fresh database.

use crate::content::{
    ConfigPatch, Features, InvestmentKind, NewInvestment, NewSlide, SettingsPatch,
    DEFAULT_ABOUT, DEFAULT_FONT_SIZE, DEFAULT_PRIMARY_COLOR,
};
use crate::store::{ContentStore, StoreResult};

const SLIDES: [(&str, &str, &str); 3] = [
    (
        "Oportunidade de Ouro",
        "Invista em projetos imobiliários premium com retorno garantido",
        "https://images.unsplash.com/photo-1486325212027-8081e485255e?w=1200&h=500&fit=crop",
    ),
    (
        "Crescimento Patrimonial",
        "Aumente seu patrimônio com investimentos imobiliários seguros",
        "https://images.unsplash.com/photo-1560518883-ce09059eeffa?w=1200&h=500&fit=crop",
    ),
    (
        "Futuro Seguro",
        "Garanta seu futuro financeiro com a Lobianco",
        "https://images.unsplash.com/photo-1454165804606-c3d57bc86b40?w=1200&h=500&fit=crop",
    ),
];

const INVESTMENTS: [(InvestmentKind, &str, &str, &str); 3] = [
    (
        InvestmentKind::Lancamentos,
        "Residencial Lobianco Premium",
        "Apartamentos de luxo no melhor bairro da cidade. Acabamento premium, localização estratégica e infraestrutura completa.",
        "https://images.unsplash.com/photo-1512207736139-afc10e0e5e6f?w=400&h=300&fit=crop",
    ),
    (
        InvestmentKind::NaPlanta,
        "Edifício Comercial Centro",
        "Salas comerciais modernas no coração do centro. Perfeito para empresas que buscam visibilidade e acessibilidade.",
        "https://images.unsplash.com/photo-1486406146926-c627a92ad1ab?w=400&h=300&fit=crop",
    ),
    (
        InvestmentKind::Aluguel,
        "Condomínio Residencial Seguro",
        "Casarões e apartamentos para aluguel em condomínio fechado. Segurança 24h, áreas de lazer e infraestrutura completa.",
        "https://images.unsplash.com/photo-1564013799919-ab600027ffc6?w=400&h=300&fit=crop",
    ),
];

/// Insert the demo slides, listings, config and settings. Does nothing
/// when the carousel already has rows. Returns whether anything was written.
pub async fn seed_demo_content(store: &dyn ContentStore) -> StoreResult<bool> {
    if !store.list_slides().await?.is_empty() {
        tracing::info!("content already present, skipping demo seed");
        return Ok(false);
    }

    for (title, description, image) in SLIDES {
        store
            .create_slide(&NewSlide {
                title: title.to_string(),
                description: Some(description.to_string()),
                image_url: Some(image.to_string()),
            })
            .await?;
    }

    for (kind, title, description, image) in INVESTMENTS {
        store
            .create_investment(&NewInvestment::from_parts(
                kind,
                title.to_string(),
                Some(description.to_string()),
                Some(image.to_string()),
                None,
                Features::default(),
            ))
            .await?;
    }

    store
        .upsert_config(&ConfigPatch {
            about: Some(Some(DEFAULT_ABOUT.to_string())),
            primary_color: Some(DEFAULT_PRIMARY_COLOR.to_string()),
            font_size: Some(DEFAULT_FONT_SIZE),
            ..ConfigPatch::default()
        })
        .await?;

    store
        .upsert_settings(&SettingsPatch {
            whatsapp: Some(Some("5511999999999".to_string())),
            facebook: Some(Some("https://facebook.com/lobiancoinvestimentos".to_string())),
            instagram: Some(Some("https://instagram.com/lobiancoinvestimentos".to_string())),
        })
        .await?;

    tracing::info!(
        slides = SLIDES.len(),
        investments = INVESTMENTS.len(),
        "demo content seeded"
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn seeds_once() {
        let store = MemoryStore::new();
        assert!(seed_demo_content(&store).await.unwrap());
        assert!(!seed_demo_content(&store).await.unwrap());

        assert_eq!(store.list_slides().await.unwrap().len(), 3);
        for kind in InvestmentKind::ALL {
            assert_eq!(store.list_investments(Some(kind)).await.unwrap().len(), 1);
        }
        assert_eq!(store.config_rows(), 1);
        assert_eq!(store.settings_rows(), 1);
        let config = store.get_config().await.unwrap().unwrap();
        assert_eq!(config.about.as_deref(), Some(DEFAULT_ABOUT));
    }
}
