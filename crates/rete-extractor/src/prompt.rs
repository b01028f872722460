//! Extraction prompt
//!
//! The model receives the instruction below followed by the full report
//! text, and is expected to answer with a JSON array of subjects.

pub const STANDARD_QUESTION: &str = r#"
Analizza il testo fornito ed estrai tutte le informazioni latenti riguardanti:
- individui (persone fisiche), anche se menzionati solo indirettamente o in ruoli secondari,
- aziende/organizzazioni (società, enti, clan, associazioni, ecc.),
- luoghi (città, quartieri, regioni, paesi, sedi, ecc.).

Per ciascun soggetto (persona, azienda/organizzazione o luogo), restituisci un oggetto JSON con i seguenti campi (usa array vuoti o stringa vuota se non ci sono dati):

[
  {
    "tipo": "persona|azienda|luogo",
    "nome": "",
    "ruolo": "",
    "organizzazione": "",
    "relazioni": [
      {"tipo": "", "con_chi": "", "contesto_relazione": ""}
    ],
    "localita_principali": [""],
    "attivita_criminali_note": [""],
    "scambi_economici_sospetti": [""],
    "accuse_formali": [""],
    "coinvolgimento_omicidi": [""],
    "altro_rilevante": ""
  }
]

Rispondi SOLO con un array JSON valido, senza testo aggiuntivo o commenti.

Testo da analizzare:
"#;

/// Instruction followed by the document text
pub fn build_prompt(question: &str, text: &str) -> String {
    format!("{question}\n\n{text}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_prompt() {
        let prompt = build_prompt("Estrai:", "Mario Rossi incontra Luigi Bianchi.");
        assert_eq!(prompt, "Estrai:\n\nMario Rossi incontra Luigi Bianchi.");
    }

    #[test]
    fn test_standard_question_names_all_fields() {
        for field in [
            "\"nome\"",
            "\"ruolo\"",
            "\"con_chi\"",
            "\"contesto_relazione\"",
            "\"localita_principali\"",
            "\"coinvolgimento_omicidi\"",
            "\"altro_rilevante\"",
        ] {
            assert!(STANDARD_QUESTION.contains(field), "missing {field}");
        }
    }
}
