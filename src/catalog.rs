//! Statement catalog.
//!
//! An ordered list of named statements for each phase. Position is
//! execution order. The built-in catalog provisions the flight network
//! graph from `airports.csv`, `airlines.csv` and `routes.csv` (staged in the
//! server's import directory) and then queries it.

use crate::error::{AirgraphError, Result};
use serde::Deserialize;
use std::path::Path;

/// A named statement.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StatementEntry {
    description: String,
    statement: String,
}

impl StatementEntry {
    /// Creates an entry.
    pub fn new(description: impl Into<String>, statement: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            statement: statement.into(),
        }
    }

    /// Human-readable name of the step.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Statement text sent to the server.
    pub fn statement(&self) -> &str {
        &self.statement
    }
}

/// The SETUP and ANALYSIS statement lists.
///
/// Immutable once built; the pipeline borrows it for the whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    setup: Vec<StatementEntry>,
    #[serde(default)]
    analysis: Vec<StatementEntry>,
}

impl Catalog {
    /// Creates a catalog from the two ordered lists.
    pub fn new(setup: Vec<StatementEntry>, analysis: Vec<StatementEntry>) -> Self {
        Self { setup, analysis }
    }

    /// Statements that build the database, in execution order.
    pub fn setup(&self) -> &[StatementEntry] {
        &self.setup
    }

    /// Read-only statements run after setup, in execution order.
    pub fn analysis(&self) -> &[StatementEntry] {
        &self.analysis
    }

    /// Returns a copy of this catalog with an empty SETUP list.
    pub fn without_setup(&self) -> Self {
        Self {
            setup: Vec::new(),
            analysis: self.analysis.clone(),
        }
    }

    /// Loads a catalog from a TOML file with `[[setup]]` and `[[analysis]]` tables.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AirgraphError::config(format!(
                "Failed to read catalog {}: {e}",
                path.display()
            ))
        })?;

        Self::parse_toml(&content).map_err(|e| {
            AirgraphError::config(format!("Catalog error in {}:\n  {}", path.display(), e.cause()))
        })
    }

    /// Parses and validates a catalog from a TOML string.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let catalog: Catalog =
            toml::from_str(content).map_err(|e| AirgraphError::config(e.to_string()))?;
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<()> {
        let phases = [("setup", &self.setup), ("analysis", &self.analysis)];
        for (phase, entries) in phases {
            for (idx, entry) in entries.iter().enumerate() {
                if entry.description.trim().is_empty() {
                    return Err(AirgraphError::config(format!(
                        "{phase} entry {} has an empty description",
                        idx + 1
                    )));
                }
                if entry.statement.trim().is_empty() {
                    return Err(AirgraphError::config(format!(
                        "{phase} entry '{}' has an empty statement",
                        entry.description
                    )));
                }
            }
        }
        Ok(())
    }

    /// The flight network catalog.
    pub fn builtin() -> Self {
        Self::new(builtin_setup(), builtin_analysis())
    }
}

fn builtin_setup() -> Vec<StatementEntry> {
    vec![
        StatementEntry::new("Wipe the database", "MATCH (n) DETACH DELETE n"),
        StatementEntry::new(
            "Import airports.csv",
            r#"
            LOAD CSV WITH HEADERS FROM "file:/airports.csv" AS l
            CREATE (airport:Airport {id: toInteger(l.AirportID), name: l.Name, city: l.City,
                country: l.Country, IATA: l.IATA, latitude: toFloat(l.Latitude),
                longitude: toFloat(l.Longitude), altitude: toFloat(l.Altitude), TimeZone: l.TZ})
            "#,
        ),
        StatementEntry::new(
            "Import airlines.csv",
            r#"
            LOAD CSV WITH HEADERS FROM "file:/airlines.csv" AS l
            CREATE (airline:Airline {id: toInteger(l.AirlineID), name: l.Name, alias: l.Alias,
                IATA: l.IATA, country: l.Country, active: l.Active})
            "#,
        ),
        StatementEntry::new(
            "Create index (1/7): Airport id",
            "CREATE INDEX airport_id_index FOR (n:Airport) ON (n.id)",
        ),
        StatementEntry::new(
            "Create index (2/7): Airline id",
            "CREATE INDEX airline_id_index FOR (n:Airline) ON (n.id)",
        ),
        StatementEntry::new(
            "Create index (3/7): Route id",
            "CREATE INDEX route_id_index FOR (n:Route) ON (n.id)",
        ),
        StatementEntry::new(
            "Create index (4/7): Airport country",
            "CREATE INDEX airport_country_index FOR (n:Airport) ON (n.country)",
        ),
        StatementEntry::new(
            "Create index (5/7): Airport city",
            "CREATE INDEX airport_city_index FOR (n:Airport) ON (n.city)",
        ),
        StatementEntry::new(
            "Create index (6/7): Airport IATA",
            "CREATE INDEX airport_iata_index FOR (n:Airport) ON (n.IATA)",
        ),
        StatementEntry::new(
            "Create index (7/7): Route name",
            "CREATE INDEX route_name_index FOR (n:Route) ON (n.name)",
        ),
        StatementEntry::new(
            "Import routes.csv as Route nodes",
            r#"
            LOAD CSV WITH HEADERS FROM "file:/routes.csv" AS l
            CALL {
                WITH l
                MERGE (airline:Airline {id: toInteger(l.AirlineID)})
                MERGE (source:Airport {id: toInteger(l.SourceAirportID)})
                MERGE (dest:Airport {id: toInteger(l.DestAirportID)})
                CREATE (route:Route {equipment: l.Equipment})
                CREATE (route)-[:from]->(source)
                CREATE (route)-[:to]->(dest)
                CREATE (route)-[:by]->(airline)
            } IN TRANSACTIONS OF 1000 ROWS
            "#,
        ),
        StatementEntry::new(
            "Derive :path relationships between airports",
            r#"
            MATCH (FROM:Airport)<-[:from]-(r:Route)-[:to]->(TO:Airport), (r)-[:by]->(comp)
            WHERE FROM <> TO
            MERGE (FROM)-[:path {airline: comp.name}]->(TO)
            "#,
        ),
        StatementEntry::new(
            "Create index on :path airline",
            "CREATE INDEX path_airline_idx FOR ()-[r:path]-() ON (r.airline)",
        ),
    ]
}

fn builtin_analysis() -> Vec<StatementEntry> {
    vec![
        StatementEntry::new(
            "Name and IATA code of French airports",
            r#"
            MATCH (a:Airport {country: 'France'})
            RETURN a.name AS Nom, a.IATA AS CodeIATA
            LIMIT 20
            "#,
        ),
        StatementEntry::new(
            "Active French airlines with an IATA code",
            r#"
            MATCH (a:Airline {country: 'France', active: 'Y'})
            WHERE a.IATA IS NOT NULL AND a.IATA <> '\\N'
            RETURN a.name AS Nom, a.IATA AS CodeIATA
            "#,
        ),
        StatementEntry::new(
            "French airlines operating at least one route",
            r#"
            MATCH (a:Airline {country: 'France'})<-[:by]-(:Route)
            RETURN DISTINCT a.name AS Nom
            "#,
        ),
        StatementEntry::new(
            "Routes departing CDG",
            r#"
            MATCH (cdg:Airport {IATA: 'CDG'})<-[:from]-(r:Route)-[:to]->(dest:Airport)
            MATCH (r)-[:by]->(airline:Airline)
            RETURN cdg.name AS Depart, airline.name AS Compagnie, dest.name AS Arrivee
            LIMIT 20
            "#,
        ),
        StatementEntry::new(
            "A380 routes departing CDG",
            r#"
            MATCH (cdg:Airport {IATA: 'CDG'})<-[:from]-(r:Route)-[:to]->(dest:Airport)
            WHERE r.equipment CONTAINS 'A380'
            MATCH (r)-[:by]->(airline:Airline)
            RETURN airline.name AS Compagnie, dest.name AS Arrivee, r.equipment AS Materiel
            "#,
        ),
        StatementEntry::new(
            "Destination cities and countries (CDG, A380)",
            r#"
            MATCH (cdg:Airport {IATA: 'CDG'})<-[:from]-(r:Route)-[:to]->(dest:Airport)
            WHERE r.equipment CONTAINS 'A380'
            RETURN DISTINCT dest.city AS Ville, dest.country AS Pays
            "#,
        ),
        StatementEntry::new(
            "Destination cities, countries and airlines (CDG, A380)",
            r#"
            MATCH (cdg:Airport {IATA: 'CDG'})<-[:from]-(r:Route)-[:to]->(dest:Airport)
            WHERE r.equipment CONTAINS 'A380'
            MATCH (r)-[:by]->(airline:Airline)
            RETURN DISTINCT dest.city AS Ville, dest.country AS Pays, airline.name AS Compagnie
            "#,
        ),
        StatementEntry::new(
            "Routes between CDG and other French airports",
            r#"
            MATCH (cdg:Airport {IATA: 'CDG'})<-[:from]-(:Route)-[:to]->(dest:Airport {country: 'France'})
            RETURN "CDG -> France" AS Direction, dest.name AS AeroportFrancais
            LIMIT 10
            UNION
            MATCH (src:Airport {country: 'France'})<-[:from]-(:Route)-[:to]->(cdg:Airport {IATA: 'CDG'})
            RETURN "France -> CDG" AS Direction, src.name AS AeroportFrancais
            LIMIT 10
            "#,
        ),
        StatementEntry::new(
            "All A380 routes",
            r#"
            MATCH (src:Airport)<-[:from]-(r:Route)-[:to]->(dest:Airport)
            WHERE r.equipment CONTAINS 'A380'
            MATCH (r)-[:by]->(airline:Airline)
            RETURN src.IATA AS Depart, dest.IATA AS Arrivee, airline.name AS Compagnie
            LIMIT 20
            "#,
        ),
        StatementEntry::new(
            "Routes from France to the United Kingdom",
            r#"
            MATCH (src:Airport {country: 'France'})<-[:from]-(r:Route)-[:to]->(dest:Airport {country: 'United Kingdom'})
            MATCH (r)-[:by]->(airline:Airline)
            RETURN src.IATA AS Depart, dest.IATA AS Arrivee, airline.name AS Compagnie
            LIMIT 20
            "#,
        ),
        StatementEntry::new(
            "Air France paths between French airports",
            r#"
            MATCH p = (a:Airport {country: 'France'})-[r:path {airline: 'Air France'}]->(b:Airport {country: 'France'})
            RETURN a.IATA AS Depart, b.IATA AS Arrivee
            LIMIT 20
            "#,
        ),
        StatementEntry::new(
            "Air France paths per destination country",
            r#"
            MATCH (a:Airport)-[r:path {airline: 'Air France'}]->(b:Airport)
            RETURN b.country AS PaysDestination, count(r) AS NombreDePaths
            ORDER BY NombreDePaths DESC
            "#,
        ),
        StatementEntry::new(
            "Paths of 2-3 hops from Nantes to Salt Lake City",
            r#"
            MATCH p = (nantes:Airport {city: 'Nantes'})-[:path*2..3]->(slc:Airport {city: 'Salt Lake City'})
            RETURN [n IN nodes(p) | n.IATA] AS Chemin, length(p) AS Sauts
            LIMIT 10
            "#,
        ),
        StatementEntry::new(
            "Shortest path from Nantes to Salt Lake City",
            r#"
            MATCH p = shortestPath(
              (nantes:Airport {city: 'Nantes'})-[:path*1..10]->(slc:Airport {city: 'Salt Lake City'})
            )
            RETURN [n IN nodes(p) | n.IATA] AS CheminLePlusCourt, length(p) AS Sauts
            "#,
        ),
    ]
}
