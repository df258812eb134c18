//! Showcase catalog
//!
//! Hand-curated, read-only reference cases for a small set of well-known
//! repurposing stories. Agents prefer this data over every other tier so
//! demo molecules always produce high-fidelity output. Loaded once at
//! process start and never mutated.

use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::models::{
    EvidenceRecord, IpConflict, PatentRecord, RegionTrend, SeriesPoint, TrialRecord,
};
use crate::verdict::{Confidence, Decision, VerdictOverlay};

#[derive(Debug, Clone)]
pub struct MarketTrends {
    pub unit: String,
    pub feasibility: f64,
    pub region_series: Vec<RegionTrend>,
    pub global_series: Vec<SeriesPoint>,
    pub negative_signals: Vec<String>,
    pub sources: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ShowcaseCase {
    pub name: String,
    pub aliases: Vec<String>,
    pub success_story: String,
    pub curated_evidence: Vec<EvidenceRecord>,
    pub curated_trials: Vec<TrialRecord>,
    pub curated_patents: Vec<PatentRecord>,
    pub market_trends: Option<MarketTrends>,
    pub expired_notes: Vec<String>,
    pub ip_conflicts: Vec<IpConflict>,
    pub ip_risk_level: String,
    pub sources: Vec<String>,
    /// Optional curated verdict narrative; overlays the score-based verdict
    /// when present.
    pub repurposing_story: Option<VerdictOverlay>,
}

#[derive(Debug, Clone, Default)]
pub struct ShowcaseCatalog {
    cases: Vec<ShowcaseCase>,
}

static CATALOG: Lazy<Arc<ShowcaseCatalog>> = Lazy::new(|| Arc::new(ShowcaseCatalog::builtin()));

/// The process-wide curated catalog.
pub fn catalog() -> Arc<ShowcaseCatalog> {
    CATALOG.clone()
}

impl ShowcaseCatalog {
    pub fn new(cases: Vec<ShowcaseCase>) -> Self {
        Self { cases }
    }

    /// Return curated showcase data when the molecule matches a spotlight
    /// case by canonical name or alias, case-insensitively.
    pub fn resolve(&self, molecule: &str) -> Option<&ShowcaseCase> {
        let canonical = molecule.trim().to_lowercase();
        if canonical.is_empty() {
            return None;
        }
        self.cases.iter().find(|case| {
            case.name.to_lowercase() == canonical
                || case
                    .aliases
                    .iter()
                    .any(|alias| alias.to_lowercase() == canonical)
        })
    }

    pub fn builtin() -> Self {
        Self::new(vec![aspirin_case(), thalidomide_case()])
    }
}

fn pt(year: i32, value: f64) -> SeriesPoint {
    SeriesPoint { year, value }
}

fn evidence(
    disease: &str,
    title: &str,
    journal: &str,
    year: i32,
    url: &str,
    evidence_type: &str,
) -> EvidenceRecord {
    EvidenceRecord {
        disease: disease.to_string(),
        title: title.to_string(),
        journal: journal.to_string(),
        year: Some(year),
        url: Some(url.to_string()),
        evidence_type: Some(evidence_type.to_string()),
        reason: None,
    }
}

#[allow(clippy::too_many_arguments)]
fn trial(
    nct_id: &str,
    trial_name: &str,
    disease: &str,
    region: &str,
    year: i32,
    enrollment: u32,
    sponsor: &str,
    evidence_note: &str,
) -> TrialRecord {
    TrialRecord {
        nct_id: Some(nct_id.to_string()),
        trial_name: trial_name.to_string(),
        phase: "Phase III".to_string(),
        status: "Completed".to_string(),
        disease: disease.to_string(),
        region: Some(region.to_string()),
        year: Some(year),
        enrollment: Some(enrollment),
        sponsor: Some(sponsor.to_string()),
        evidence_note: evidence_note.to_string(),
        url: Some(format!("https://clinicaltrials.gov/study/{nct_id}")),
    }
}

fn patent(number: &str, title: &str, assignee: &str, focus: &str) -> PatentRecord {
    PatentRecord {
        number: Some(number.to_string()),
        title: Some(title.to_string()),
        date: None,
        assignee: Some(assignee.to_string()),
        url: Some(format!("https://patents.google.com/patent/{number}")),
        focus: Some(focus.to_string()),
    }
}

fn aspirin_case() -> ShowcaseCase {
    ShowcaseCase {
        name: "aspirin".to_string(),
        aliases: vec![
            "acetylsalicylic acid".to_string(),
            "aspirine".to_string(),
            "asa".to_string(),
        ],
        success_story: "Low-dose aspirin evolved from a common analgesic into a cornerstone of \
                        cardiovascular and obstetric prevention. Large randomized trials such as \
                        the Physicians' Health Study, Women's Health Study, and the ASPRE trial \
                        demonstrated significant reductions in myocardial infarction, ischemic \
                        stroke, and preterm preeclampsia."
            .to_string(),
        curated_evidence: vec![
            evidence(
                "Cardiovascular prevention in women",
                "A randomized trial of low-dose aspirin in the primary prevention of \
                 cardiovascular disease in women",
                "New England Journal of Medicine",
                2005,
                "https://pubmed.ncbi.nlm.nih.gov/15753114/",
                "Randomized placebo-controlled trial",
            ),
            evidence(
                "High-risk pregnancies (preeclampsia)",
                "Aspirin versus Placebo in Pregnancies at High Risk for Preterm Preeclampsia",
                "New England Journal of Medicine",
                2017,
                "https://pubmed.ncbi.nlm.nih.gov/28657417/",
                "ASPRE Phase III trial",
            ),
            evidence(
                "Older adults primary prevention",
                "Effect of Aspirin on Cardiovascular Events and Bleeding in the Healthy Elderly",
                "New England Journal of Medicine",
                2018,
                "https://pubmed.ncbi.nlm.nih.gov/30221597/",
                "ASPREE randomized trial",
            ),
            evidence(
                "Type 2 diabetes primary prevention",
                "Effects of Aspirin for Primary Prevention in Persons with Diabetes Mellitus",
                "New England Journal of Medicine",
                2018,
                "https://pubmed.ncbi.nlm.nih.gov/30146931/",
                "ASCEND randomized trial",
            ),
        ],
        curated_trials: vec![
            trial(
                "NCT00000543",
                "Women's Health Study",
                "Primary prevention in women",
                "United States",
                2005,
                39876,
                "Brigham and Women's Hospital / NIH",
                "Reduced ischemic stroke by ~24%.",
            ),
            trial(
                "NCT01124786",
                "ASPRE Trial",
                "High-risk pregnancies",
                "Europe",
                2017,
                1776,
                "Fetal Medicine Foundation",
                "150 mg nightly aspirin reduced preterm preeclampsia by 62%.",
            ),
            trial(
                "NCT00135226",
                "ASCEND Trial",
                "Type 2 diabetes primary prevention",
                "United Kingdom",
                2018,
                15480,
                "University of Oxford",
                "Lower vascular events with increased bleeding risk.",
            ),
            trial(
                "NCT00145030",
                "ARRIVE Trial",
                "Moderate cardiovascular risk adults",
                "International",
                2018,
                12546,
                "Bayer Healthcare",
                "No significant CV benefit in moderate-risk adults.",
            ),
        ],
        curated_patents: vec![
            patent(
                "US20140275092A1",
                "Methods for reducing the risk of preeclampsia",
                "National Institutes of Health",
                "Low-dose aspirin prophylaxis in high-risk pregnancy",
            ),
            patent(
                "US20130183211A1",
                "Aspirin-based regimens for colorectal cancer prevention",
                "Brigham and Women's Hospital",
                "Chemoprevention using sustained low-dose aspirin",
            ),
            patent(
                "US20170258985A1",
                "Dual pathway inhibition using aspirin and factor Xa inhibitors",
                "Bayer / Janssen",
                "Aspirin + anticoagulant combination therapy",
            ),
            patent(
                "US4555399A",
                "Enteric-coated aspirin tablet",
                "Bayer AG",
                "Reduced gastric irritation formulation",
            ),
            patent(
                "WO2011098721A1",
                "Chronotherapy dosing of aspirin",
                "Universidad de Murcia",
                "Night-time aspirin dosing optimization",
            ),
        ],
        market_trends: Some(MarketTrends {
            unit: "USD billions (antiplatelet & maternal-fetal prophylaxis)".to_string(),
            feasibility: 0.78,
            region_series: vec![
                RegionTrend {
                    region: "North America".to_string(),
                    cagr: 0.037,
                    notes: "U.S. cardiology and maternal-fetal medicine clinics continue to \
                            expand aspirin prophylaxis pathways."
                        .to_string(),
                    series: vec![pt(2020, 1.1), pt(2022, 1.2), pt(2024, 1.35), pt(2026, 1.45)],
                },
                RegionTrend {
                    region: "Europe".to_string(),
                    cagr: 0.031,
                    notes: "NICE and ESC guidelines continue to drive steady aspirin demand \
                            despite generic pricing pressure."
                        .to_string(),
                    series: vec![pt(2020, 0.9), pt(2022, 1.0), pt(2024, 1.12), pt(2026, 1.18)],
                },
                RegionTrend {
                    region: "Asia-Pacific".to_string(),
                    cagr: 0.058,
                    notes: "Rapid adoption of hypertensive pregnancy screening programs boosts \
                            aspirin volumes across APAC."
                        .to_string(),
                    series: vec![pt(2020, 0.5), pt(2022, 0.62), pt(2024, 0.75), pt(2026, 0.92)],
                },
            ],
            global_series: vec![
                pt(2020, 2.7),
                pt(2021, 2.8),
                pt(2022, 3.0),
                pt(2023, 3.2),
                pt(2024, 3.4),
                pt(2025, 3.6),
                pt(2026, 3.8),
            ],
            negative_signals: vec![
                "ASPREE (NCT01038583) flagged elevated bleeding risk when aspirin is used for \
                 primary prevention in the very elderly."
                    .to_string(),
                "Competition from combination oral anticoagulants keeps pricing pressure on \
                 stand-alone aspirin SKUs."
                    .to_string(),
            ],
            sources: vec![
                "IQVIA 2024 Antiplatelet Forecast".to_string(),
                "Frost & Sullivan 2023 Maternal Health Market Report".to_string(),
            ],
        }),
        expired_notes: Vec::new(),
        ip_conflicts: Vec::new(),
        ip_risk_level: "Moderate".to_string(),
        sources: Vec::new(),
        repurposing_story: Some(VerdictOverlay {
            decision: Some(Decision::Go),
            confidence: Some(Confidence::High),
            summary: Some(
                "Aspirin is the canonical repurposing success: an analgesic turned \
                 low-dose cardiovascular staple, with preeclampsia prophylaxis as an \
                 established second act."
                    .to_string(),
            ),
            primary_opportunity: Some("Cardiovascular Disease".to_string()),
            secondary_opportunities: Some(vec![
                "Preeclampsia prevention".to_string(),
                "Colorectal cancer chemoprevention".to_string(),
            ]),
            why_it_works: Some(vec![
                "Irreversible COX-1 inhibition suppresses platelet aggregation at low doses"
                    .to_string(),
                "Decades of outcome trials quantify the benefit-risk trade precisely".to_string(),
            ]),
            risk_summary: Some(vec![
                "Bleeding risk limits primary prevention in the very elderly".to_string(),
                "Generic pricing leaves no margin for costly development programs".to_string(),
            ]),
            recommended_next_steps: Some(vec![
                "Target guideline inclusion for high-risk preeclampsia cohorts".to_string(),
                "Pursue fixed-dose combinations where IP can still be layered".to_string(),
            ]),
        }),
    }
}

fn thalidomide_case() -> ShowcaseCase {
    ShowcaseCase {
        name: "thalidomide".to_string(),
        aliases: vec!["alpha-phthalimidoglutarimide".to_string()],
        success_story: "Thalidomide was repurposed from a withdrawn sedative into a life-saving \
                        immunomodulatory drug. Controlled trials demonstrated efficacy in \
                        erythema nodosum leprosum and multiple myeloma, leading to FDA \
                        reapproval under strict risk management programs."
            .to_string(),
        curated_evidence: vec![
            evidence(
                "Erythema nodosum leprosum",
                "Double-blind clinical trial of thalidomide in the treatment of erythema \
                 nodosum leprosum",
                "Indian Journal of Dermatology, Venereology and Leprology",
                1999,
                "https://pubmed.ncbi.nlm.nih.gov/10395864/",
                "Controlled clinical trial",
            ),
            evidence(
                "Multiple myeloma",
                "Thalidomide plus melphalan and prednisone versus melphalan and prednisone alone",
                "The Lancet",
                2006,
                "https://pubmed.ncbi.nlm.nih.gov/16551797/",
                "IFM 99-06 Phase III trial",
            ),
        ],
        curated_trials: vec![
            trial(
                "NCT00002674",
                "IFM 99-06: Thalidomide + Melphalan + Prednisone",
                "Multiple myeloma",
                "France / Europe",
                2006,
                447,
                "Intergroupe Francophone du Myélome",
                "Improved progression-free survival in newly diagnosed multiple myeloma.",
            ),
            trial(
                "NCT00002535",
                "Thalidomide for Severe ENL",
                "Erythema nodosum leprosum",
                "Global",
                1998,
                145,
                "National Hansen's Disease Programs",
                "Rapid lesion resolution with steroid-sparing durability.",
            ),
        ],
        curated_patents: vec![
            patent(
                "US5604209A",
                "Therapeutic methods using thalidomide",
                "Celgene Corporation",
                "TNF-α mediated inflammatory diseases",
            ),
            patent(
                "US6136785A",
                "Methods of inhibiting TNF-alpha using thalidomide",
                "Celgene Corporation",
                "Immunomodulatory mechanism of action",
            ),
            patent(
                "US6569851B2",
                "Use of thalidomide for angiogenesis-mediated diseases",
                "Celgene Corporation",
                "Anti-angiogenic oncology indications",
            ),
            patent(
                "US20070161564A1",
                "Combination therapy of thalidomide with chemotherapeutic agents",
                "Celgene Corporation",
                "Multiple myeloma combination regimens",
            ),
            patent(
                "US20100069347A1",
                "Risk management systems for teratogenic drugs",
                "Celgene Corporation",
                "Controlled distribution and REMS frameworks",
            ),
        ],
        market_trends: Some(MarketTrends {
            unit: "USD billions (IMiD / plasma cell disorder market)".to_string(),
            feasibility: 0.82,
            region_series: vec![
                RegionTrend {
                    region: "North America".to_string(),
                    cagr: 0.055,
                    notes: "Front-line adoption in transplant-ineligible multiple myeloma keeps \
                            demand resilient."
                        .to_string(),
                    series: vec![pt(2020, 5.2), pt(2022, 5.8), pt(2024, 6.4), pt(2026, 7.1)],
                },
                RegionTrend {
                    region: "Europe".to_string(),
                    cagr: 0.043,
                    notes: "Managed entry agreements preserve thalidomide access for newly \
                            diagnosed myeloma."
                        .to_string(),
                    series: vec![pt(2020, 3.1), pt(2022, 3.4), pt(2024, 3.8), pt(2026, 4.2)],
                },
                RegionTrend {
                    region: "Asia-Pacific".to_string(),
                    cagr: 0.076,
                    notes: "Brazil, India, and China scale IMiD access programs for \
                            relapsed/refractory patients."
                        .to_string(),
                    series: vec![pt(2020, 1.8), pt(2022, 2.2), pt(2024, 2.8), pt(2026, 3.3)],
                },
            ],
            global_series: vec![
                pt(2020, 10.5),
                pt(2021, 11.2),
                pt(2022, 12.1),
                pt(2023, 13.0),
                pt(2024, 13.8),
                pt(2025, 14.6),
                pt(2026, 15.5),
            ],
            negative_signals: vec![
                "Lenalidomide and pomalidomide patent cliffs intensify competition for IMiD \
                 share."
                    .to_string(),
                "Stringent REMS controls elevate distribution costs relative to lenalidomide \
                 generics."
                    .to_string(),
            ],
            sources: vec![
                "Evaluate Pharma 2024 Multiple Myeloma Outlook".to_string(),
                "GlobalData 2023 Immunomodulatory Drug Forecast".to_string(),
            ],
        }),
        expired_notes: Vec::new(),
        ip_conflicts: Vec::new(),
        ip_risk_level: "Moderate".to_string(),
        sources: Vec::new(),
        repurposing_story: Some(VerdictOverlay {
            decision: Some(Decision::Go),
            confidence: Some(Confidence::High),
            summary: Some(
                "Thalidomide went from withdrawn sedative to first-line multiple myeloma \
                 therapy, proving that rigorous risk management can rehabilitate even a \
                 notorious molecule."
                    .to_string(),
            ),
            primary_opportunity: Some("Multiple Myeloma".to_string()),
            secondary_opportunities: Some(vec![
                "Erythema Nodosum Leprosum".to_string(),
                "Myelodysplastic syndromes".to_string(),
            ]),
            why_it_works: Some(vec![
                "Cereblon-mediated degradation of IKZF1/3 starves myeloma cells".to_string(),
                "Anti-angiogenic and immunomodulatory effects compound the benefit".to_string(),
            ]),
            risk_summary: Some(vec![
                "Teratogenicity mandates strict REMS distribution controls".to_string(),
                "Next-generation IMiDs compete on efficacy and tolerability".to_string(),
            ]),
            recommended_next_steps: Some(vec![
                "Position as cost-effective backbone in access-constrained markets".to_string(),
                "Explore maintenance regimens where newer IMiDs are unaffordable".to_string(),
            ]),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_by_canonical_name() {
        let catalog = ShowcaseCatalog::builtin();
        assert!(catalog.resolve("aspirin").is_some());
        assert!(catalog.resolve("thalidomide").is_some());
    }

    #[test]
    fn test_resolve_is_case_insensitive_and_alias_aware() {
        let catalog = ShowcaseCatalog::builtin();
        assert_eq!(catalog.resolve("ASA").unwrap().name, "aspirin");
        assert_eq!(
            catalog.resolve("  Acetylsalicylic Acid ").unwrap().name,
            "aspirin"
        );
        assert_eq!(
            catalog.resolve("Alpha-Phthalimidoglutarimide").unwrap().name,
            "thalidomide"
        );
    }

    #[test]
    fn test_unknown_molecule_resolves_to_none() {
        let catalog = ShowcaseCatalog::builtin();
        assert!(catalog.resolve("unobtainium").is_none());
        assert!(catalog.resolve("").is_none());
    }

    #[test]
    fn test_curated_collections_are_non_empty() {
        let catalog = ShowcaseCatalog::builtin();
        for name in ["aspirin", "thalidomide"] {
            let case = catalog.resolve(name).unwrap();
            assert!(!case.curated_evidence.is_empty());
            assert!(!case.curated_trials.is_empty());
            assert!(!case.curated_patents.is_empty());
            assert!(case.market_trends.is_some());
        }
    }
}
