//! Tabular reader for commune datasets.
//!
//! Rows are decoded into [`RawCommune`], where every column is an optional
//! string. Interpretation of the text is left to [`crate::normalize`].

use anyhow::{Context, Result};
use csv::{ByteRecord, ReaderBuilder, StringRecord};
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

/// One input row before coercion.
///
/// Every field is the raw cell text, `None` when the column is absent or the
/// cell is empty.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RawCommune {
    pub insee_code: Option<String>,
    pub name: Option<String>,
    pub department: Option<String>,
    pub population: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub political_color: Option<String>,
    pub representation_fee: Option<String>,
    pub eur_per_capita: Option<String>,
    pub total_charges: Option<String>,
    pub charges_personnel: Option<String>,
    pub charges_purchases_services: Option<String>,
    pub charges_financial: Option<String>,
    pub charges_exceptional: Option<String>,
    pub charges_other_management: Option<String>,
    pub fee_ratio: Option<String>,
}

/// A column of [`RawCommune`], addressable by header name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    InseeCode,
    Name,
    Department,
    Population,
    Latitude,
    Longitude,
    PoliticalColor,
    RepresentationFee,
    EurPerCapita,
    TotalCharges,
    ChargesPersonnel,
    ChargesPurchasesServices,
    ChargesFinancial,
    ChargesExceptional,
    ChargesOtherManagement,
    FeeRatio,
}

/// Canonical header and source-export header of each field.
static FIELD_HEADERS: &[(Field, &str, &str)] = &[
    (Field::InseeCode, "insee_code", "CODE_COMMUNE"),
    (Field::Name, "name", "NOM_COMMUNE"),
    (Field::Department, "department", "DEPARTEMENT"),
    (Field::Population, "population", "POP_2022"),
    (Field::Latitude, "latitude", "LATITUDE"),
    (Field::Longitude, "longitude", "LONGITUDE"),
    (Field::PoliticalColor, "political_color", "COUL_POL"),
    (Field::RepresentationFee, "representation_fee", "FRAIS_REPRESENTATION"),
    (Field::EurPerCapita, "eur_per_capita", "EUR_PAR_HAB"),
    (Field::TotalCharges, "total_charges", "TOTAL_CHARGES"),
    (Field::ChargesPersonnel, "charges_personnel", "CHARGES_PERSONNEL"),
    (Field::ChargesPurchasesServices, "charges_purchases_services", "ACHATS_SERVICES"),
    (Field::ChargesFinancial, "charges_financial", "CHARGES_FINANCIERES"),
    (Field::ChargesExceptional, "charges_exceptional", "CHARGES_EXCEPT"),
    (Field::ChargesOtherManagement, "charges_other_management", "AUTRES_CHARGES_GESTION"),
    (Field::FeeRatio, "fee_ratio", "RATIO_FRAIS_REP"),
];

impl Field {
    /// Resolves a header, canonical or source-export form. Unknown headers give `None`.
    pub fn from_header(header: &str) -> Option<Self> {
        let header = header.trim();
        FIELD_HEADERS
            .iter()
            .find(|(_, canonical, alias)| *canonical == header || *alias == header)
            .map(|(field, _, _)| *field)
    }
}

impl RawCommune {
    fn slot(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::InseeCode => &mut self.insee_code,
            Field::Name => &mut self.name,
            Field::Department => &mut self.department,
            Field::Population => &mut self.population,
            Field::Latitude => &mut self.latitude,
            Field::Longitude => &mut self.longitude,
            Field::PoliticalColor => &mut self.political_color,
            Field::RepresentationFee => &mut self.representation_fee,
            Field::EurPerCapita => &mut self.eur_per_capita,
            Field::TotalCharges => &mut self.total_charges,
            Field::ChargesPersonnel => &mut self.charges_personnel,
            Field::ChargesPurchasesServices => &mut self.charges_purchases_services,
            Field::ChargesFinancial => &mut self.charges_financial,
            Field::ChargesExceptional => &mut self.charges_exceptional,
            Field::ChargesOtherManagement => &mut self.charges_other_management,
            Field::FeeRatio => &mut self.fee_ratio,
        }
    }
}

/// Column position to field, resolved once from the header row.
///
/// When several columns resolve to the same field the leftmost one wins and
/// the others are ignored.
#[derive(Debug, Clone, Default)]
pub struct ColumnMap {
    columns: Vec<Option<Field>>,
}

impl ColumnMap {
    pub fn from_headers(headers: &StringRecord) -> Self {
        let mut taken: Vec<Field> = Vec::new();
        let columns = headers
            .iter()
            .map(|header| {
                let field = Field::from_header(header)?;
                if taken.contains(&field) {
                    warn!(header, "Column maps to an already bound field, ignoring it");
                    return None;
                }
                taken.push(field);
                Some(field)
            })
            .collect();
        Self { columns }
    }

    pub fn bound(&self) -> usize {
        self.columns.iter().flatten().count()
    }

    /// Fills a [`RawCommune`] from one record. Missing trailing cells and
    /// empty cells stay `None`.
    pub fn read(&self, record: &StringRecord) -> RawCommune {
        let mut raw = RawCommune::default();
        for (field, cell) in self.columns.iter().zip(record.iter()) {
            match field {
                Some(field) if !cell.is_empty() => *raw.slot(*field) = Some(cell.to_string()),
                _ => {}
            }
        }
        raw
    }
}

/// Picks `;` when the header line contains one, `,` otherwise.
pub fn detect_delimiter(header_line: &str) -> u8 {
    if header_line.contains(';') { b';' } else { b',' }
}

/// Reads every row of a CSV source into [`RawCommune`] values.
///
/// Rows are never dropped: each readable cell lands in its field, whatever
/// the rest of the row looks like. Only I/O failures are errors.
pub fn parse_rows<R: Read>(mut reader: R) -> Result<Vec<RawCommune>> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;

    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(&bytes[..]);
    let first_line = bytes.split(|b| *b == b'\n').next().unwrap_or_default();
    let delimiter = detect_delimiter(&String::from_utf8_lossy(first_line));

    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(bytes);

    let columns = ColumnMap::from_headers(&lossy(rdr.byte_headers()?));
    debug!(
        delimiter = %(delimiter as char),
        bound_columns = columns.bound(),
        "Reading commune rows"
    );

    let mut rows = Vec::new();
    let mut record = ByteRecord::new();
    while rdr.read_byte_record(&mut record)? {
        rows.push(columns.read(&lossy(&record)));
    }

    Ok(rows)
}

/// Opens `path` and reads it with [`parse_rows`].
#[tracing::instrument(skip(path), fields(path = %path.display()))]
pub fn read_rows(path: &Path) -> Result<Vec<RawCommune>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open dataset {}", path.display()))?;
    parse_rows(file).with_context(|| format!("failed to read dataset {}", path.display()))
}

fn lossy(record: &ByteRecord) -> StringRecord {
    record
        .iter()
        .map(|field| String::from_utf8_lossy(field).into_owned())
        .collect()
}
