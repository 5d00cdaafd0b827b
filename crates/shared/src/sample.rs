//! Static demo data shown by every screen.

use crate::domain::{
    CertificatePreview, CertificationTrack, Course, CourseModule, Level, QuizQuestion, StudyDay,
};

pub const BADGES_EARNED: u32 = 7;

pub fn sample_courses() -> Vec<Course> {
    vec![
        Course::new(
            "aml-101",
            "Fundamentos de PLA/FT para Cooperativas",
            "Marco legal, riesgos y controles clave en Honduras.",
            Level::Basic,
            "4h 30m",
            65,
            &["Cumplimiento", "Cooperativas", "Honduras"],
        ),
        Course::new(
            "aml-201",
            "Gestión de Riesgo LA/FT basada en ISO 31000",
            "Metodología práctica de identificación y matrices.",
            Level::Intermediate,
            "6h 10m",
            15,
            &["Riesgo", "ISO 31000"],
        ),
        Course::new(
            "reg-101",
            "Normativa CNBS para el Sector Cooperativo",
            "Obligaciones, reportes, y mejores prácticas locales.",
            Level::Basic,
            "3h 05m",
            0,
            &["CNBS", "Regulación"],
        ),
        Course::new(
            "fraud-110",
            "Fraude Operativo: Señales y Controles",
            "Casos reales en CA, indicadores y protocolos.",
            Level::Intermediate,
            "5h 20m",
            0,
            &["Fraude", "Operaciones"],
        ),
    ]
}

pub fn weekly_study() -> Vec<StudyDay> {
    [
        ("Lun", 35),
        ("Mar", 12),
        ("Mié", 55),
        ("Jue", 28),
        ("Vie", 40),
        ("Sáb", 75),
        ("Dom", 20),
    ]
    .into_iter()
    .map(|(weekday, minutes)| StudyDay {
        weekday: weekday.to_string(),
        minutes,
    })
    .collect()
}

pub fn course_modules() -> Vec<CourseModule> {
    [
        (1, "Introducción al marco PLA/FT", "14:28", true),
        (2, "Obligaciones regulatorias y reportes", "11:12", true),
        (3, "Metodología de evaluación de riesgo", "18:44", false),
        (4, "Señales de alerta y casos", "16:01", false),
        (5, "Examen final y certificación", "10:03", false),
    ]
    .into_iter()
    .map(|(id, title, duration, done)| CourseModule {
        id,
        title: title.to_string(),
        duration: duration.to_string(),
        done,
    })
    .collect()
}

/// First module that is not finished yet, i.e. the one the player resumes.
pub fn current_module(modules: &[CourseModule]) -> Option<&CourseModule> {
    modules.iter().find(|module| !module.done)
}

pub fn quick_quiz() -> QuizQuestion {
    QuizQuestion {
        prompt: "¿Cuál es el objetivo principal de la evaluación de riesgo LA/FT?".to_string(),
        options: vec![
            "Priorizar recursos de mitigación".to_string(),
            "Cumplir únicamente con el marco legal".to_string(),
            "Detectar fraudes internos".to_string(),
        ],
    }
}

/// Lesson description shown by the player when no course was opened.
pub const DEFAULT_LESSON_DESCRIPTION: &str = "Aprende a construir matrices de riesgo y controles mitigantes con ejemplos tropicalizados a Honduras y CA.";

pub fn course_resources() -> Vec<&'static str> {
    vec![
        "Plantilla matriz de riesgo (XLSX)",
        "Checklist de alertas (PDF)",
        "Guía de reportes regulatorios (PDF)",
    ]
}

pub fn certificate_preview() -> CertificatePreview {
    CertificatePreview {
        issuer: "Red Consult".to_string(),
        holder: "Josue Chahin".to_string(),
        course_title: "Fundamentos de PLA/FT para Cooperativas".to_string(),
        certificate_id: "RC-AML-101-2025-000123".to_string(),
        issued_on: "26 Ago 2025".to_string(),
        verification: "QR / Enlace único".to_string(),
        signatory: "Director Académico".to_string(),
        completion_percent: 72,
        criteria: vec![
            "Completar todos los módulos (100%).".to_string(),
            "Obtener al menos 80% en el examen final.".to_string(),
            "Aprobar 2 casos prácticos evaluados.".to_string(),
            "Verificación pública mediante ID o QR.".to_string(),
        ],
    }
}

pub fn certification_tracks() -> Vec<CertificationTrack> {
    ["PLA/FT Cooperativas", "Oficial de Cumplimiento"]
        .into_iter()
        .map(|name| CertificationTrack {
            name: name.to_string(),
        })
        .collect()
}

/// Topics offered by the catalog's topic selector.
pub fn catalog_topics() -> Vec<&'static str> {
    vec!["Cumplimiento", "Riesgo", "Fraude"]
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn sample_course_ids_are_unique() {
        let courses = sample_courses();
        let ids: HashSet<_> = courses.iter().map(|c| c.id.clone()).collect();
        assert_eq!(ids.len(), courses.len());
    }

    #[test]
    fn player_resumes_at_first_unfinished_module() {
        let modules = course_modules();
        let current = current_module(&modules).expect("an unfinished module");
        assert_eq!(current.id, 3);
        assert_eq!(current.duration, "18:44");
    }

    #[test]
    fn weekly_study_covers_the_whole_week() {
        let week = weekly_study();
        assert_eq!(week.len(), 7);
        assert_eq!(week.iter().map(|d| d.minutes).sum::<u32>(), 265);
    }
}
