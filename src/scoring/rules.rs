//! Declarative building blocks for control points.
//!
//! Keyword tables and numeric ladders live here as data so each evaluator
//! reads as a short decision tree over named signals. The
//! [`ControlPointBuilder`] records which signals were found and which were
//! absent; that record becomes the control point's justification.

use super::text::QuoteText;
use super::types::ControlPointScore;

/// Keyword signal worth a share of a control point's budget.
#[derive(Debug, Clone, Copy)]
pub struct KeywordRule {
    /// Signal name written to the justification
    pub signal: &'static str,
    /// Normalized keywords, any of which evidences the signal
    pub keywords: &'static [&'static str],
    /// Share of the control point awarded when found (0.0-1.0)
    pub share: f64,
}

/// Named signal evidenced by any of several overlapping phrasings.
///
/// A group counts once however many of its keywords appear, so "service
/// apres-vente" and "apres-vente" stay a single signal.
#[derive(Debug, Clone, Copy)]
pub struct KeywordGroup {
    pub signal: &'static str,
    pub keywords: &'static [&'static str],
}

/// Signals of the groups found in the text, in table order.
#[must_use]
pub fn matched_signals(text: &QuoteText, groups: &[KeywordGroup]) -> Vec<&'static str> {
    groups
        .iter()
        .filter(|group| text.first_match(group.keywords).is_some())
        .map(|group| group.signal)
        .collect()
}

/// Share awarded by an "at least" ladder, best step first.
///
/// Returns the share of the first step whose threshold `value` reaches,
/// or `0.0` below the last step.
#[must_use]
pub fn ladder_share(value: f64, ladder: &[(f64, f64)]) -> f64 {
    ladder
        .iter()
        .find(|(threshold, _)| value >= *threshold)
        .map_or(0.0, |(_, share)| *share)
}

/// Share awarded for a count of distinct signals, capped at the last entry.
#[must_use]
pub fn count_share(count: usize, shares: &[f64]) -> f64 {
    match shares.len() {
        0 => 0.0,
        len => shares[count.min(len - 1)],
    }
}

/// Incrementally scored control point.
#[derive(Debug, Clone)]
pub struct ControlPointBuilder {
    id: &'static str,
    max_points: f64,
    awarded: f64,
    found: Vec<String>,
    absent: Vec<String>,
    notes: Vec<String>,
    confidence: u8,
}

impl ControlPointBuilder {
    pub fn new(id: &'static str, max_points: f64) -> Self {
        Self {
            id,
            max_points,
            awarded: 0.0,
            found: Vec::new(),
            absent: Vec::new(),
            notes: Vec::new(),
            confidence: 90,
        }
    }

    /// Award a share of the budget for a signal that was found.
    pub fn award(&mut self, share: f64, signal: impl Into<String>) -> &mut Self {
        self.awarded += share * self.max_points;
        self.found.push(signal.into());
        self
    }

    /// Award a share of the budget without recording a signal.
    pub fn credit(&mut self, share: f64) -> &mut Self {
        self.awarded += share * self.max_points;
        self
    }

    /// Record a signal that was looked for and not found.
    pub fn absent(&mut self, signal: impl Into<String>) -> &mut Self {
        self.absent.push(signal.into());
        self
    }

    /// Record a found signal that carries no points by itself.
    pub fn found(&mut self, signal: impl Into<String>) -> &mut Self {
        self.found.push(signal.into());
        self
    }

    pub fn note(&mut self, note: impl Into<String>) -> &mut Self {
        self.notes.push(note.into());
        self
    }

    pub fn confidence(&mut self, confidence: u8) -> &mut Self {
        self.confidence = confidence;
        self
    }

    /// Lower confidence, never raising it.
    pub fn cap_confidence(&mut self, confidence: u8) -> &mut Self {
        self.confidence = self.confidence.min(confidence);
        self
    }

    /// Evaluate keyword rules against the quote text.
    ///
    /// Returns how many rules matched.
    pub fn keyword_rules(&mut self, text: &QuoteText, rules: &[KeywordRule]) -> usize {
        let mut hits = 0;
        for rule in rules {
            match text.first_match(rule.keywords) {
                Some(keyword) => {
                    hits += 1;
                    self.award(rule.share, format!("{} (\"{keyword}\")", rule.signal));
                }
                None => {
                    self.absent(rule.signal);
                }
            }
        }
        hits
    }

    /// Finish the control point, clamping the score into its budget.
    #[must_use]
    pub fn build(self) -> ControlPointScore {
        let mut parts = Vec::new();
        if !self.found.is_empty() {
            parts.push(format!("found: {}", self.found.join(", ")));
        }
        if !self.absent.is_empty() {
            parts.push(format!("absent: {}", self.absent.join(", ")));
        }
        parts.extend(self.notes);
        let justification = if parts.is_empty() {
            "no signal evaluated".to_string()
        } else {
            parts.join("; ")
        };
        ControlPointScore::new(
            self.id,
            self.awarded,
            self.max_points,
            justification,
            self.confidence,
        )
    }
}

// Keyword tables. Every entry is normalized (lowercase, no accents).

pub const DECENNIAL_KEYWORDS: &[&str] = &[
    "decennale",
    "garantie decennale",
    "assurance decennale",
    "responsabilite decennale",
];

pub const CIVIL_LIABILITY_KEYWORDS: &[&str] = &[
    "responsabilite civile",
    "rc pro",
    "rc professionnelle",
    "rc decennale",
];

pub const INSURER_KEYWORDS: &[&str] = &[
    "assureur",
    "compagnie d'assurance",
    "axa",
    "allianz",
    "maaf",
    "maif",
    "macif",
    "groupama",
    "smabtp",
    "generali",
    "mma",
    "l'auxiliaire",
    "hiscox",
    "abeille",
    "covea",
];

pub const COVERAGE_AREA_KEYWORDS: &[&str] =
    &["couverture geographique", "zone geographique", "france metropolitaine"];

pub const LEGAL_FORM_KEYWORDS: &[&str] = &[
    "sarl",
    "sasu",
    "s.a.s",
    "sas au capital",
    "societe par actions simplifiee",
    "eurl",
    "entreprise individuelle",
    "micro-entreprise",
    "auto-entrepreneur",
    "capital social",
    "au capital de",
];

/// Project or trade types for which decennial insurance is mandatory.
pub const STRUCTURAL_WORK_KEYWORDS: &[&str] = &[
    "construction",
    "renovation",
    "extension",
    "toiture",
    "couverture",
    "charpente",
    "maconnerie",
    "gros oeuvre",
    "isolation",
    "plomberie",
    "electricite",
    "chauffage",
    "menuiserie",
    "carrelage",
    "facade",
];

pub const WITHDRAWAL_KEYWORDS: &[&str] =
    &["droit de retractation", "delai de retractation", "retractation"];

pub const MEDIATOR_KEYWORDS: &[&str] = &["mediateur", "mediation de la consommation"];

pub const LATE_PENALTY_KEYWORDS: &[&str] = &[
    "penalites de retard",
    "penalite de retard",
    "interets de retard",
];

pub const RECOVERY_INDEMNITY_KEYWORDS: &[&str] = &[
    "indemnite forfaitaire",
    "40 euros",
    "40 eur",
    "40 €",
    "frais de recouvrement",
];

pub const VAT_EXEMPTION_KEYWORDS: &[&str] = &["tva non applicable", "article 293 b", "art. 293 b"];

pub const LABOR_KEYWORDS: &[&str] = &[
    "main d'oeuvre",
    "main-d'oeuvre",
    "pose",
    "installation",
    "taux horaire",
    "heure",
];

pub const MATERIAL_KEYWORDS: &[&str] = &["fourniture", "materiel", "materiaux", "equipement"];

pub const LUMP_SUM_KEYWORDS: &[&str] = &["forfait", "forfaitaire", "ensemble"];

/// Units that denote a lump-sum line.
pub const LUMP_SUM_UNITS: &[&str] = &["forfait", "ff", "ens", "fft", "global"];

/// Legal French VAT rates, in percent.
pub const LEGAL_VAT_RATES: &[f64] = &[20.0, 10.0, 5.5, 2.1, 0.0];

pub const TECHNICAL_GROUPS: &[KeywordGroup] = &[
    KeywordGroup {
        signal: "standards",
        keywords: &["dtu", "norme", "nf"],
    },
    KeywordGroup {
        signal: "dimensions",
        keywords: &["epaisseur", "dimensions", "mm"],
    },
    KeywordGroup {
        signal: "thermal performance",
        keywords: &["resistance thermique", "lambda", "conductivite", "uw"],
    },
    KeywordGroup {
        signal: "power rating",
        keywords: &["puissance", "kw", "kwh"],
    },
    KeywordGroup {
        signal: "product identification",
        keywords: &["marque", "modele", "reference"],
    },
];

/// Trades whose works are exposed to the weather.
pub const OUTDOOR_WORK_KEYWORDS: &[&str] = &[
    "toiture",
    "couverture",
    "facade",
    "ravalement",
    "terrassement",
    "maconnerie",
    "charpente",
    "gros oeuvre",
    "extension",
    "construction",
    "piscine",
    "jardin",
    "exterieur",
    "amenagement exterieur",
];

pub const WEATHER_PROVISION_KEYWORDS: &[&str] = &[
    "intemperies",
    "conditions climatiques",
    "conditions meteo",
    "meteo",
    "hors gel",
    "report en cas",
];

pub const SITE_PREPARATION_KEYWORDS: &[&str] = &[
    "protection",
    "preparation du chantier",
    "installation de chantier",
    "nettoyage",
    "evacuation",
    "depose",
    "bache",
    "echafaudage",
    "mise en securite",
];

/// Line items that support the works rather than deliver requested scope.
pub const ANCILLARY_WORK_KEYWORDS: &[&str] = &[
    "deplacement",
    "protection",
    "nettoyage",
    "evacuation",
    "installation de chantier",
    "preparation",
];

pub const VALIDITY_KEYWORDS: &[&str] = &["validite", "valable", "offre valable"];

pub const REGISTRATION_KEYWORDS: &[&str] = &[
    "rcs",
    "registre du commerce",
    "repertoire des metiers",
    "rm",
    "chambre des metiers",
];

pub const PAYMENT_SCHEDULE_GROUPS: &[KeywordGroup] = &[
    KeywordGroup {
        signal: "payment schedule",
        keywords: &["echeancier", "modalites de paiement", "situation de travaux"],
    },
    KeywordGroup {
        signal: "upfront instalment",
        keywords: &["a la commande", "a la signature"],
    },
    KeywordGroup {
        signal: "final instalment",
        keywords: &["fin de chantier", "a la reception", "solde"],
    },
];

pub const PERFECT_COMPLETION_KEYWORDS: &[&str] = &["parfait achevement"];

pub const BIENNIAL_KEYWORDS: &[&str] = &[
    "biennale",
    "bon fonctionnement",
    "garantie de 2 ans",
    "garantie 2 ans",
];

pub const COMMERCIAL_WARRANTY_KEYWORDS: &[&str] = &[
    "garantie commerciale",
    "extension de garantie",
    "garantie constructeur",
    "garantie fabricant",
    "garantie pieces",
    "garantie contractuelle",
];

pub const AFTER_SALES_GROUPS: &[KeywordGroup] = &[
    KeywordGroup {
        signal: "after-sales service",
        keywords: &["service apres-vente", "apres-vente", "sav"],
    },
    KeywordGroup {
        signal: "maintenance",
        keywords: &["contrat d'entretien", "contrat de maintenance", "entretien", "maintenance"],
    },
    KeywordGroup {
        signal: "repair call-out",
        keywords: &["depannage", "assistance"],
    },
];

pub const START_DATE_KEYWORDS: &[&str] = &[
    "date de debut",
    "debut des travaux",
    "demarrage",
    "intervention prevue",
];

pub const DURATION_KEYWORDS: &[&str] = &[
    "duree des travaux",
    "duree",
    "delai d'execution",
    "semaines",
    "jours ouvres",
];

pub const ENERGY_EFFICIENCY_KEYWORDS: &[&str] = &[
    "pompe a chaleur",
    "isolation",
    "double vitrage",
    "triple vitrage",
    "led",
    "thermostat",
    "vmc double flux",
    "chaudiere a condensation",
    "solaire",
    "photovoltaique",
    "re2020",
    "rt2012",
    "bbc",
    "domotique",
    "regulation",
];

pub const FINANCIAL_AID_KEYWORDS: &[&str] = &[
    "maprimerenov",
    "cee",
    "certificats d'economie",
    "eco-ptz",
    "eco ptz",
    "credit d'impot",
    "anah",
    "tva a 5,5",
    "tva 5,5",
];

pub const ECO_MATERIAL_KEYWORDS: &[&str] = &[
    "biosource",
    "fibre de bois",
    "ouate de cellulose",
    "chanvre",
    "recycle",
    "ecolabel",
    "pefc",
    "fsc",
    "faible emission",
    "bas carbone",
];

pub const WASTE_MANAGEMENT_KEYWORDS: &[&str] = &[
    "evacuation des dechets",
    "gestion des dechets",
    "tri des dechets",
    "dechetterie",
    "recyclage",
    "bordereau de suivi",
    "benne",
    "dechets",
];

/// Well-known trade qualification bodies.
pub const QUALIFICATION_KEYWORDS: &[&str] = &[
    "qualibat",
    "rge",
    "qualifelec",
    "qualigaz",
    "qualipac",
    "qualisol",
    "qualibois",
    "qualipv",
    "handibat",
];

/// Qualifications expected for a trade: trade keywords, then qualifications.
pub const TRADE_QUALIFICATIONS: &[(&[&str], &[&str])] = &[
    (&["electric"], &["qualifelec", "consuel"]),
    (
        &["plomberie", "chauffage", "chaudiere", "gaz"],
        &["qualigaz", "qualipac", "qualibois", "pg", "professionnel du gaz"],
    ),
    (&["photovolta", "solaire"], &["qualipv", "qualisol", "rge"]),
    (&["isolation", "energetique"], &["rge", "qualibat"]),
    (
        &["toiture", "couverture", "charpente", "maconnerie", "gros oeuvre", "facade"],
        &["qualibat"],
    ),
];

/// Customer rating (0-5) ladder.
pub const RATING_LADDER: &[(f64, f64)] = &[
    (4.5, 1.0),
    (4.0, 0.85),
    (3.5, 0.65),
    (3.0, 0.45),
    (0.0, 0.15),
];

/// Company age in years ladder.
pub const MATURITY_LADDER: &[(f64, f64)] = &[(10.0, 1.0), (5.0, 0.8), (2.0, 0.5), (0.0, 0.25)];

/// Mean words per line-item description ladder.
pub const DESCRIPTION_LADDER: &[(f64, f64)] =
    &[(8.0, 1.0), (5.0, 0.75), (3.0, 0.5), (0.0, 0.25)];
