//! # Maturity Catalog
//!
//! Static reference data attached to computed levels:
//! - one `MaturityProfile` per level (color, title, description)
//! - one `RecommendationSet` per (level, axis)
//!
//! The tables are built once per process and never mutated. Lookups with a
//! level outside 1..=5 or an unknown axis are configuration errors.

use crate::{Axis, AxisLevelResult, EsgError, Level};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

// =============================================================================
// RECORDS
// =============================================================================

/// Descriptive profile of a maturity level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaturityProfile {
    pub level: Level,
    pub color: String,
    pub title: String,
    pub description: String,
}

/// Recommendations for one axis at one level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationSet {
    pub axis: Axis,
    pub recommendations: Vec<String>,
}

/// Profile and recommendations for a (level, axis) lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrichment {
    pub profile: MaturityProfile,
    pub recommendations: RecommendationSet,
}

/// A classification result with its reference data attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedLevel {
    pub result: AxisLevelResult,
    pub profile: MaturityProfile,
    pub recommendations: RecommendationSet,
}

/// Single summary maturity: the weakest axis decides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalMaturity {
    pub axis: Axis,
    pub profile: MaturityProfile,
    pub recommendations: Vec<String>,
}

// =============================================================================
// STATIC CONTENT
// =============================================================================

const PROFILES: [(Level, &str, &str, &str); 5] = [
    (
        Level::Elementary,
        "red",
        "Elementar",
        "A organização possui um processo de identificação de atendimento da legislação e restringe-se à abordagem da legislação e requisitos regulamentares (quando pertinente) e/ou trata o tema ou critério de forma incipiente, se não houver requisitos regulamentares obrigatórios.",
    ),
    (
        Level::NonIntegrated,
        "orange",
        "Não Integrado",
        "A organização trata o critério de modo inicial por meio de práticas dispersas, ainda não integradas de modo satisfatório com a gestão.",
    ),
    (
        Level::Managerial,
        "yellow",
        "Gerencial",
        "A partir do estágio 3, a liderança já possui uma atuação mais consciente em relação a temas ESG materiais para seu negócio, indo além da legislação. As práticas possuem enfoque operacional e passam a ser gerenciadas em processos estruturados, com o objetivo de mitigar riscos de imagem, reputação e melhorias em eficiência e qualidade. As organizações aumentam sua visão em relação aos temas ESG, e os líderes têm um envolvimento mais profundo, assumindo o papel de coordenação do tema, ampliando o nível de aprendizado e inovação corporativa. Neste contexto, se inicia a aderência ao que chamamos de práticas ESG.",
    ),
    (
        Level::Strategic,
        "green",
        "Estratégico",
        "A organização trata o critério, entendendo os riscos e seus impactos positivos (oportunidades) e negativos (ameaças) relacionados ao negócio (incluindo a cadeia de valor), considerando-os na tomada de decisão estratégica. A organização contribui com soluções para os desafios ESG pela diferenciação de produtos e serviços. A organização estabelece objetivos e metas, e comunica os seus resultados. A organização promove inovação tecnológica ou novos modelos de negócio que viabilizem novas abordagens sobre o tema em questão, maximizando a agregação de valor para o negócio. A organização promove o engajamento das partes interessadas, compreendendo suas expectativas e necessidades, de modo a gerar impactos sociais e ambientais positivos dentro do conceito de valor compartilhado.",
    ),
    (
        Level::Transformative,
        "blue",
        "Transformador",
        "A organização já posicionou o ESG como base de seu modelo estratégico de negócio, e atua para impactar e influenciar outras organizações no fortalecimento dessa pauta, em um movimento mais amplo frente ao seu setor de atividade e cadeias de valor. O trabalho de impacto e influência é uma disciplina contínua e evolutiva. A organização passa por transformações para gerar valor compartilhado e trata o critério de forma a influenciar e catalisar mudanças transformacionais que fortaleçam a pauta ESG em um cenário mais amplo. A organização promove engajamento estruturado com as partes interessadas e grupos impactados neste tema, buscando a superação conjunta das metas estabelecidas e a maximização dos impactos positivos sociais e ambientais. A organização apresenta liderança, buscando protagonismo frente ao seu setor de atividade e cadeias de valor, realizando, de forma sistemática, a defesa do tema com a sociedade, de modo mais amplo para o estabelecimento de programas privados e políticas públicas estruturantes.",
    ),
];

const RECOMMENDATIONS: [(Level, Axis, [&str; 2]); 15] = [
    (
        Level::Elementary,
        Axis::Environmental,
        [
            "Desenvolver um plano de ação para atender aos requisitos ambientais regulatórios.",
            "Implementar práticas básicas de gestão ambiental.",
        ],
    ),
    (
        Level::Elementary,
        Axis::Social,
        [
            "Iniciar programas de treinamento e desenvolvimento para funcionários.",
            "Estabelecer políticas de diversidade e inclusão.",
        ],
    ),
    (
        Level::Elementary,
        Axis::Governance,
        [
            "Aumentar a transparência nas práticas de governança.",
            "Rever e melhorar as políticas de compliance e ética.",
        ],
    ),
    (
        Level::NonIntegrated,
        Axis::Environmental,
        [
            "Integrar práticas ambientais nas operações diárias.",
            "Desenvolver uma estratégia de gestão ambiental mais estruturada.",
        ],
    ),
    (
        Level::NonIntegrated,
        Axis::Social,
        [
            "Formalizar e documentar programas de treinamento e desenvolvimento.",
            "Estabelecer metas claras para a diversidade e inclusão.",
        ],
    ),
    (
        Level::NonIntegrated,
        Axis::Governance,
        [
            "Melhorar a formação e o treinamento dos membros do conselho.",
            "Estabelecer processos para maior independência e eficácia do conselho.",
        ],
    ),
    (
        Level::Managerial,
        Axis::Environmental,
        [
            "Implementar sistemas de gestão ambiental integrados.",
            "Realizar avaliações de impacto ambiental periódicas.",
        ],
    ),
    (
        Level::Managerial,
        Axis::Social,
        [
            "Desenvolver programas de engajamento comunitário.",
            "Estabelecer canais de comunicação interna para feedback dos funcionários.",
        ],
    ),
    (
        Level::Managerial,
        Axis::Governance,
        [
            "Integrar políticas de governança com os processos operacionais.",
            "Estabelecer comitês dedicados à gestão de ESG.",
        ],
    ),
    (
        Level::Strategic,
        Axis::Environmental,
        [
            "Desenvolver e implementar metas ambientais alinhadas à estratégia de negócios.",
            "Adotar tecnologias sustentáveis para otimizar o uso de recursos.",
        ],
    ),
    (
        Level::Strategic,
        Axis::Social,
        [
            "Estabelecer indicadores de desempenho social e monitorá-los regularmente.",
            "Promover iniciativas de responsabilidade social corporativa alinhadas com a estratégia empresarial.",
        ],
    ),
    (
        Level::Strategic,
        Axis::Governance,
        [
            "Integrar ESG na governança corporativa com metas e indicadores claros.",
            "Realizar auditorias de governança para garantir o alinhamento com as práticas estratégicas de ESG.",
        ],
    ),
    (
        Level::Transformative,
        Axis::Environmental,
        [
            "Liderar iniciativas setoriais de sustentabilidade e promover parcerias estratégicas.",
            "Influenciar políticas públicas ambientais e participar de fóruns internacionais sobre sustentabilidade.",
        ],
    ),
    (
        Level::Transformative,
        Axis::Social,
        [
            "Desenvolver programas de impacto social de grande escala e influenciar práticas do setor.",
            "Colaborar com ONGs e outras organizações para promover mudanças sociais significativas.",
        ],
    ),
    (
        Level::Transformative,
        Axis::Governance,
        [
            "Estabelecer padrões de governança de ESG reconhecidos globalmente.",
            "Atuar como referência em governança de ESG, influenciando outras organizações e o setor como um todo.",
        ],
    ),
];

// =============================================================================
// CATALOG
// =============================================================================

/// Immutable lookup tables for profiles and recommendations.
#[derive(Debug)]
pub struct MaturityCatalog {
    profiles: BTreeMap<Level, MaturityProfile>,
    recommendations: BTreeMap<(Level, Axis), RecommendationSet>,
}

impl MaturityCatalog {
    fn build() -> Self {
        let profiles = PROFILES
            .iter()
            .map(|&(level, color, title, description)| {
                (
                    level,
                    MaturityProfile {
                        level,
                        color: color.to_string(),
                        title: title.to_string(),
                        description: description.to_string(),
                    },
                )
            })
            .collect();

        let recommendations = RECOMMENDATIONS
            .iter()
            .map(|&(level, axis, items)| {
                (
                    (level, axis),
                    RecommendationSet {
                        axis,
                        recommendations: items.iter().map(|s| (*s).to_string()).collect(),
                    },
                )
            })
            .collect();

        Self {
            profiles,
            recommendations,
        }
    }

    /// The process-wide catalog, built on first use.
    pub fn global() -> &'static MaturityCatalog {
        static CATALOG: OnceLock<MaturityCatalog> = OnceLock::new();
        CATALOG.get_or_init(Self::build)
    }

    /// Profile of a level.
    pub fn profile(&self, level: Level) -> Result<&MaturityProfile, EsgError> {
        self.profiles
            .get(&level)
            .ok_or_else(|| EsgError::Configuration(format!("no profile for level {}", level)))
    }

    /// Recommendations for an axis at a level.
    pub fn recommendations(&self, level: Level, axis: Axis) -> Result<&RecommendationSet, EsgError> {
        self.recommendations.get(&(level, axis)).ok_or_else(|| {
            EsgError::Configuration(format!(
                "no recommendations for level {} axis {}",
                level,
                axis.key()
            ))
        })
    }

    /// Typed lookup of profile and recommendations.
    pub fn enrich_level(&self, level: Level, axis: Axis) -> Result<Enrichment, EsgError> {
        Ok(Enrichment {
            profile: self.profile(level)?.clone(),
            recommendations: self.recommendations(level, axis)?.clone(),
        })
    }

    /// Lookup from raw values; a bad level or axis is a configuration error.
    pub fn enrich(&self, level: u8, axis: &str) -> Result<Enrichment, EsgError> {
        let level = Level::try_from(level)
            .map_err(|e| EsgError::Configuration(e.to_string()))?;
        let axis = Axis::parse(axis).map_err(|e| EsgError::Configuration(e.to_string()))?;
        self.enrich_level(level, axis)
    }

    /// Attach reference data to a classification result.
    pub fn enrich_result(&self, result: &AxisLevelResult) -> Result<EnrichedLevel, EsgError> {
        let enrichment = self.enrich_level(result.level, result.axis)?;
        Ok(EnrichedLevel {
            result: result.clone(),
            profile: enrichment.profile,
            recommendations: enrichment.recommendations,
        })
    }

    /// Recommendations of every axis at a level, in canonical axis order.
    pub fn cumulative_recommendations(&self, level: Level) -> Result<Vec<String>, EsgError> {
        let mut all = Vec::new();
        for axis in Axis::ALL {
            all.extend(self.recommendations(level, axis)?.recommendations.iter().cloned());
        }
        Ok(all)
    }

    /// Summary maturity for a set of axis results.
    ///
    /// The lowest level wins; on ties the first result in input order. With
    /// `cumulative` the recommendations of all axes at that level are used,
    /// otherwise only those of the winning axis. `None` for empty input.
    pub fn final_maturity(
        &self,
        results: &[AxisLevelResult],
        cumulative: bool,
    ) -> Result<Option<FinalMaturity>, EsgError> {
        let Some(weakest) = results
            .iter()
            .reduce(|lowest, r| if r.level < lowest.level { r } else { lowest })
        else {
            return Ok(None);
        };

        let recommendations = if cumulative {
            self.cumulative_recommendations(weakest.level)?
        } else {
            self.recommendations(weakest.level, weakest.axis)?
                .recommendations
                .clone()
        };

        Ok(Some(FinalMaturity {
            axis: weakest.axis,
            profile: self.profile(weakest.level)?.clone(),
            recommendations,
        }))
    }
}

// =============================================================================
// TESTS
// =============================================================================
