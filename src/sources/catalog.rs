//! The built-in catalog of health tips.
//!
//! Three hand-written entries, each translated into every supported
//! language. The catalog is identical across runs; only the run timestamp
//! changes the output.

use super::{Attribution, ContentSource};
use crate::models::{ContentEntry, Language, Translation};
use std::collections::BTreeMap;

/// Source backed by [`catalog`].
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticCatalog;

impl ContentSource for StaticCatalog {
    fn name(&self) -> &str {
        "static"
    }

    fn attribution(&self) -> Attribution {
        Attribution::Human
    }

    async fn entries(&self) -> Vec<ContentEntry> {
        catalog()
    }
}

fn entry(id: &str, tags: &[&str], translations: [(Language, &str, &str); 3]) -> ContentEntry {
    ContentEntry {
        id: id.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        translations: translations
            .into_iter()
            .map(|(lang, title, html)| (lang, Translation::new(title, html)))
            .collect::<BTreeMap<_, _>>(),
    }
}

/// The catalog entries, in publication order.
pub fn catalog() -> Vec<ContentEntry> {
    vec![
        entry(
            "water",
            &["hidratação", "saúde", "bem-estar"],
            [
                (
                    Language::Pt,
                    "A importância de beber água todos os dias",
                    "<p>Manter o corpo hidratado é essencial para o bom funcionamento do organismo.</p>\
                     <p>A água auxilia na digestão, circulação, controle da temperatura corporal e eliminação de toxinas.</p>\
                     <p>O ideal é consumir água ao longo do dia, mesmo sem sentir sede.</p>",
                ),
                (
                    Language::En,
                    "Why drinking water every day matters",
                    "<p>Keeping your body hydrated is essential for it to work properly.</p>\
                     <p>Water helps digestion, circulation, body temperature control and the removal of toxins.</p>\
                     <p>Drink water throughout the day, even when you are not thirsty.</p>",
                ),
                (
                    Language::Es,
                    "La importancia de beber agua todos los días",
                    "<p>Mantener el cuerpo hidratado es esencial para el buen funcionamiento del organismo.</p>\
                     <p>El agua ayuda a la digestión, la circulación, el control de la temperatura corporal y la eliminación de toxinas.</p>\
                     <p>Lo ideal es beber agua a lo largo del día, incluso sin sentir sed.</p>",
                ),
            ],
        ),
        entry(
            "sleep",
            &["sono", "qualidade de vida", "saúde"],
            [
                (
                    Language::Pt,
                    "Por que dormir bem melhora sua saúde",
                    "<p>Uma boa noite de sono é fundamental para a recuperação física e mental.</p>\
                     <p>Dormir mal pode afetar o sistema imunológico, a memória e o humor.</p>\
                     <p>Manter horários regulares para dormir ajuda a melhorar a qualidade do sono.</p>",
                ),
                (
                    Language::En,
                    "Why sleeping well improves your health",
                    "<p>A good night's sleep is key to physical and mental recovery.</p>\
                     <p>Poor sleep can affect the immune system, memory and mood.</p>\
                     <p>Keeping regular bedtimes helps improve sleep quality.</p>",
                ),
                (
                    Language::Es,
                    "Por qué dormir bien mejora tu salud",
                    "<p>Una buena noche de sueño es fundamental para la recuperación física y mental.</p>\
                     <p>Dormir mal puede afectar el sistema inmunológico, la memoria y el estado de ánimo.</p>\
                     <p>Mantener horarios regulares para dormir ayuda a mejorar la calidad del sueño.</p>",
                ),
            ],
        ),
        entry(
            "food",
            &["alimentação", "nutrição", "saúde"],
            [
                (
                    Language::Pt,
                    "Alimentação equilibrada faz diferença no dia a dia",
                    "<p>Uma alimentação balanceada fornece os nutrientes necessários para o corpo funcionar bem.</p>\
                     <p>Evitar ultraprocessados e priorizar alimentos naturais melhora a disposição.</p>\
                     <p>Pequenas mudanças já trazem grandes benefícios.</p>",
                ),
                (
                    Language::En,
                    "A balanced diet makes a difference every day",
                    "<p>A balanced diet provides the nutrients your body needs to work well.</p>\
                     <p>Avoiding ultra-processed foods and favoring natural ones improves your energy.</p>\
                     <p>Small changes already bring big benefits.</p>",
                ),
                (
                    Language::Es,
                    "Una alimentación equilibrada marca la diferencia en el día a día",
                    "<p>Una alimentación balanceada aporta los nutrientes que el cuerpo necesita para funcionar bien.</p>\
                     <p>Evitar los ultraprocesados y priorizar los alimentos naturales mejora la energía.</p>\
                     <p>Pequeños cambios ya traen grandes beneficios.</p>",
                ),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;

    #[test]
    fn test_catalog_ids_in_order() {
        let ids: Vec<String> = catalog().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["water", "sleep", "food"]);
    }

    #[test]
    fn test_catalog_fully_translated() {
        for entry in catalog() {
            for lang in Language::ALL {
                let t = entry
                    .translation(lang)
                    .unwrap_or_else(|| panic!("{} missing {lang}", entry.id));
                assert!(!t.title.is_empty());
                assert!(t.html.starts_with("<p>"));
            }
            assert_eq!(entry.tags.len(), 3);
        }
    }

    #[test]
    fn test_catalog_ids_unique() {
        assert!(catalog().iter().map(|e| &e.id).all_unique());
    }

    #[tokio::test]
    async fn test_static_source_is_deterministic() {
        let source = StaticCatalog;
        assert_eq!(source.entries().await, source.entries().await);
        assert_eq!(source.attribution(), Attribution::Human);
        assert_eq!(source.name(), "static");
    }
}
