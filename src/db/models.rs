use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::db::rows::Table;

/// Primary key of a backend row. Tables use either integer or UUID keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowId {
    Int(i64),
    Text(String),
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowId::Int(id) => write!(f, "{id}"),
            RowId::Text(id) => f.write_str(id),
        }
    }
}

fn default_true() -> bool {
    true
}

/// A news article (`actualites`). `contenu` holds markdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actualite {
    pub id: RowId,
    pub titre: String,
    #[serde(default)]
    pub resume: Option<String>,
    #[serde(default)]
    pub contenu: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub categorie: Option<String>,
    #[serde(default = "default_true")]
    pub publie: bool,
    #[serde(default)]
    pub date_publication: Option<DateTime<Utc>>,
}

impl Table for Actualite {
    const NAME: &'static str = "actualites";
}

/// A legal or administrative document (`documents`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentOfficiel {
    pub id: RowId,
    pub titre: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub categorie: Option<String>,
    #[serde(default)]
    pub fichier_url: Option<String>,
    #[serde(default)]
    pub date_publication: Option<NaiveDate>,
}

impl Table for DocumentOfficiel {
    const NAME: &'static str = "documents";
}

/// A service offered to taxpayers (`services`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: RowId,
    pub nom: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icone: Option<String>,
    #[serde(default)]
    pub ordre: i32,
    #[serde(default = "default_true")]
    pub actif: bool,
}

impl Table for Service {
    const NAME: &'static str = "services";
}

/// A taxpayer tip (`conseils`). `contenu` holds markdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conseil {
    pub id: RowId,
    pub titre: String,
    #[serde(default)]
    pub contenu: String,
}

impl Table for Conseil {
    const NAME: &'static str = "conseils";
}

/// A key figure shown on the home page (`chiffres_cles`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChiffreCle {
    pub id: RowId,
    pub libelle: String,
    pub valeur: String,
    #[serde(default)]
    pub unite: Option<String>,
    #[serde(default)]
    pub ordre: i32,
}

impl Table for ChiffreCle {
    const NAME: &'static str = "chiffres_cles";
}

/// An office or point of interest placed on the map (`entites_cartographie`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntiteCartographique {
    pub id: RowId,
    pub nom: String,
    pub type_entite: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub adresse: Option<String>,
    #[serde(default)]
    pub telephone: Option<String>,
}

impl Table for EntiteCartographique {
    const NAME: &'static str = "entites_cartographie";
}

impl EntiteCartographique {
    pub fn has_valid_position(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// One bracket of a tax-simulation scale (`baremes`). `taux` is a percentage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bareme {
    pub id: RowId,
    pub impot: String,
    pub tranche_min: f64,
    #[serde(default)]
    pub tranche_max: Option<f64>,
    pub taux: f64,
    #[serde(default)]
    pub montant_fixe: Option<f64>,
}

impl Table for Bareme {
    const NAME: &'static str = "baremes";
}

/// An entry of the admin activity journal (`journal_activites`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalActivite {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RowId>,
    pub action: String,
    pub table_cible: String,
    #[serde(default)]
    pub element_id: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Table for JournalActivite {
    const NAME: &'static str = "journal_activites";
}

/// A message sent through the contact form (`messages`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: RowId,
    pub nom: String,
    pub email: String,
    #[serde(default)]
    pub sujet: Option<String>,
    pub contenu: String,
    #[serde(default)]
    pub lu: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Table for Message {
    const NAME: &'static str = "messages";
}

/// Tables the admin API may write to.
pub const ADMIN_TABLES: &[&str] = &[
    Actualite::NAME,
    DocumentOfficiel::NAME,
    Service::NAME,
    Conseil::NAME,
    ChiffreCle::NAME,
    EntiteCartographique::NAME,
    Bareme::NAME,
    JournalActivite::NAME,
    Message::NAME,
];

/// Tables readable without the service token.
pub const PUBLIC_TABLES: &[&str] = &[
    Actualite::NAME,
    DocumentOfficiel::NAME,
    Service::NAME,
    Conseil::NAME,
    ChiffreCle::NAME,
    EntiteCartographique::NAME,
    Bareme::NAME,
];
