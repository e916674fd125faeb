//! Rapport de reconstruction avec graceful degradation
//!
//! Collecte les compteurs de chaque fichier traité : les données ignorées par
//! la reconstruction ne sont jamais des erreurs, seuls les fichiers illisibles
//! le sont.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use osm_rings::{Origin, ReconstructStats};
use serde::Serialize;

/// Statut global du traitement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunStatus {
    /// Tous les fichiers traités
    Success,
    /// Certains fichiers illisibles
    PartialSuccess,
    /// Aucun fichier traité
    Failed,
}

/// Fichier en échec
#[derive(Debug, Clone, Serialize)]
pub struct FileError {
    pub file: String,
    pub message: String,
}

/// Polygones écrits par provenance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OriginStats {
    /// Ways `outer` fermés seuls
    pub relation_members: usize,
    /// Rings assemblés
    pub relations: usize,
    /// Ways hors relation
    pub ways: usize,
}

impl OriginStats {
    pub fn record(&mut self, origin: &Origin) {
        match origin {
            Origin::RelationMember { .. } => self.relation_members += 1,
            Origin::Relation { .. } => self.relations += 1,
            Origin::Way { .. } => self.ways += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.relation_members + self.relations + self.ways
    }
}

/// Résultat d'un fichier
#[derive(Debug, Clone, Default, Serialize)]
pub struct FileSummary {
    pub elements: usize,
    pub stats: ReconstructStats,
    pub by_origin: OriginStats,
    /// Rings au hash déjà vu dans ce fichier
    pub duplicates: usize,
    /// Doublons retirés de la sortie (`--dedupe`)
    pub dropped_duplicates: usize,
}

/// Rapport complet
#[derive(Debug, Clone, Serialize)]
pub struct ReconstructReport {
    /// Durée du traitement
    pub duration_secs: f64,
    /// Statut global
    pub status: RunStatus,

    /// Nombre de fichiers traités
    pub files_processed: usize,
    /// Nombre de fichiers en échec
    pub files_failed: usize,
    /// Éléments Overpass décodés
    pub elements: usize,
    /// Polygones écrits
    pub polygons_written: usize,
    /// Rings en double (même hash)
    pub duplicates: usize,
    /// Doublons retirés de la sortie
    pub dropped_duplicates: usize,

    /// Compteurs cumulés de la reconstruction
    pub stats: ReconstructStats,
    /// Polygones écrits par provenance
    pub by_origin: OriginStats,

    /// Liste des erreurs
    pub errors: Vec<FileError>,
}

impl Default for ReconstructReport {
    fn default() -> Self {
        Self {
            duration_secs: 0.0,
            status: RunStatus::Success,
            files_processed: 0,
            files_failed: 0,
            elements: 0,
            polygons_written: 0,
            duplicates: 0,
            dropped_duplicates: 0,
            stats: ReconstructStats::default(),
            by_origin: OriginStats::default(),
            errors: Vec::new(),
        }
    }
}

impl ReconstructReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enregistre un fichier traité avec succès
    pub fn record_file(&mut self, summary: &FileSummary) {
        self.files_processed += 1;
        self.elements += summary.elements;
        self.polygons_written += summary.by_origin.total();
        self.duplicates += summary.duplicates;
        self.dropped_duplicates += summary.dropped_duplicates;

        self.by_origin.relation_members += summary.by_origin.relation_members;
        self.by_origin.relations += summary.by_origin.relations;
        self.by_origin.ways += summary.by_origin.ways;

        let s = &summary.stats;
        self.stats.relations += s.relations;
        self.stats.outer_members += s.outer_members;
        self.stats.unknown_way_members += s.unknown_way_members;
        self.stats.standalone_ways += s.standalone_ways;
        self.stats.dropped_node_refs += s.dropped_node_refs;
        self.stats.degenerate_rings += s.degenerate_rings;
        self.stats.stitched_rings += s.stitched_rings;
        self.stats.failed_stitches += s.failed_stitches;
    }

    /// Enregistre un fichier en échec
    pub fn record_file_failure(&mut self, file: &str, message: &str) {
        self.files_processed += 1;
        self.files_failed += 1;
        self.errors.push(FileError {
            file: file.to_string(),
            message: message.to_string(),
        });
    }

    /// Définit la durée du traitement
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    /// Détermine le statut final
    pub fn finalize(&mut self) {
        let succeeded = self.files_processed - self.files_failed;

        self.status = if self.files_failed == 0 {
            RunStatus::Success
        } else if succeeded > 0 {
            RunStatus::PartialSuccess
        } else {
            RunStatus::Failed
        };
    }

    /// Affiche le rapport sur la sortie d'erreur (stdout peut porter les données)
    pub fn display(&self) {
        eprintln!("\n{}", "=".repeat(60));
        eprintln!("RECONSTRUCTION REPORT");
        eprintln!("{}", "=".repeat(60));

        eprintln!("\nStatus: {:?}", self.status);
        eprintln!("Duration: {:.2}s", self.duration_secs);

        eprintln!("\n--- SUMMARY ---");
        eprintln!(
            "Files: {} processed, {} failed",
            self.files_processed, self.files_failed
        );
        eprintln!(
            "Polygons: {} written ({} relation members, {} stitched, {} ways)",
            self.polygons_written,
            self.by_origin.relation_members,
            self.by_origin.relations,
            self.by_origin.ways
        );
        eprintln!(
            "Duplicates: {} found, {} dropped",
            self.duplicates, self.dropped_duplicates
        );

        eprintln!("\n--- DATA ---");
        eprintln!(
            "Elements: {}, relations: {}, standalone ways: {}",
            self.elements, self.stats.relations, self.stats.standalone_ways
        );
        eprintln!(
            "Skipped: {} missing node refs, {} unknown outer ways, {} degenerate rings, {} failed stitches",
            self.stats.dropped_node_refs,
            self.stats.unknown_way_members,
            self.stats.degenerate_rings,
            self.stats.failed_stitches
        );

        if !self.errors.is_empty() {
            eprintln!("\n--- ERRORS ({}) ---", self.errors.len());
            for e in self.errors.iter().take(20) {
                eprintln!("  [{}] {}", e.file, e.message);
            }
            if self.errors.len() > 20 {
                eprintln!("  ... and {} more", self.errors.len() - 20);
            }
        }

        eprintln!("\n{}", "=".repeat(60));
    }

    /// Sauvegarde le rapport en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Affichage compact pour le résumé
    pub fn summary(&self) -> String {
        format!(
            "{} files: {} polygons, {} duplicates, {} errors",
            self.files_processed,
            self.polygons_written,
            self.duplicates,
            self.errors.len()
        )
    }
}
