//! Extract → edit → reconstruct, across the public API.

use minuta_contract::{extract, reconstruct, ContractGenerator};
use minuta_core::{CompanyRecord, ContractData};
use minuta_docx::xml::{Element, Node};
use minuta_docx::{wml, Block, Document};
use tempfile::TempDir;

fn save(doc: &mut Document, dir: &TempDir, name: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    doc.save(&path).unwrap();
    path
}

#[test]
fn test_text_round_trip_keeps_paragraphs() {
    let dir = TempDir::new().unwrap();
    let paragraphs = [
        "CONTRATO DE PRESTAÇÃO DE SERVIÇOS",
        "CLÁUSULA PRIMEIRA – DO OBJETO",
        "O presente contrato tem por objeto a prestação de serviços contábeis & fiscais.",
        "São Paulo, 1º de maio de 2024.",
    ];
    let mut doc = Document::new();
    for p in paragraphs {
        doc.add_paragraph(p);
    }
    let original = save(&mut doc, &dir, "texto.docx");

    let text = extract(&original);
    let rebuilt = reconstruct(&original, &text).unwrap();

    assert_eq!(Document::open(&rebuilt).unwrap().paragraph_texts(), paragraphs);
}

#[test]
fn test_soft_break_splits_paragraph() {
    let dir = TempDir::new().unwrap();
    let mut doc = Document::new();
    doc.add_paragraph("Rua das Flores, 10");
    let paragraph = doc.paragraphs_mut().next().unwrap();
    let run = wml::runs_mut(paragraph).into_iter().next().unwrap();
    run.children.push(Node::Element(Element::new("w:br")));
    run.children.push(Node::Element(
        Element::new("w:t").with_text("Campinas/SP"),
    ));
    let original = save(&mut doc, &dir, "quebra.docx");

    // A line break inside a paragraph reads back as a paragraph boundary.
    let text = extract(&original);
    assert_eq!(text, "Rua das Flores, 10\nCampinas/SP");
    let rebuilt = Document::open(&reconstruct(&original, &text).unwrap()).unwrap();
    assert_eq!(rebuilt.paragraph_texts(), ["Rua das Flores, 10", "Campinas/SP"]);
}

#[test]
fn test_table_round_trip() {
    let dir = TempDir::new().unwrap();
    let mut doc = Document::new();
    doc.add_table(&[
        vec!["A".to_string(), "B".to_string()],
        vec!["C".to_string(), "D".to_string()],
    ]);
    let original = save(&mut doc, &dir, "tabela.docx");

    let text = extract(&original);
    assert!(text
        .lines()
        .any(|l| l == r#"[TABLE_JSON][["A","B"],["C","D"]][/TABLE_JSON]"#));

    let rebuilt = Document::open(&reconstruct(&original, &text).unwrap()).unwrap();
    let tables: Vec<_> = rebuilt
        .blocks()
        .into_iter()
        .filter_map(|b| match b {
            Block::Table(t) => Some(t),
            Block::Paragraph(_) => None,
        })
        .collect();
    assert_eq!(tables.len(), 1);
    assert_eq!(
        wml::table_cells(tables[0]),
        vec![vec!["A", "B"], vec!["C", "D"]]
    );
}

#[test]
fn test_user_edits_survive_and_bad_table_does_not_abort() {
    let dir = TempDir::new().unwrap();
    let mut doc = Document::new();
    doc.add_paragraph("Valor mensal: R$ 1.000,00");
    let original = save(&mut doc, &dir, "valor.docx");

    let edited = extract(&original).replace("1.000,00", "1.250,00")
        + "\n\n[TABLE_JSON]{not valid json[/TABLE_JSON]\n\n"
        + r#"[TABLE_JSON][["Serviço","Fornecedor"],["Folha"]][/TABLE_JSON]"#;
    let rebuilt = Document::open(&reconstruct(&original, &edited).unwrap()).unwrap();

    assert_eq!(
        rebuilt.paragraph_texts(),
        [
            "Valor mensal: R$ 1.250,00",
            "",
            "[TABLE_JSON]{not valid json[/TABLE_JSON]",
            "",
        ]
    );
    let table = rebuilt.tables().next().unwrap();
    assert_eq!(
        wml::table_cells(table),
        vec![vec!["Serviço", "Fornecedor"], vec!["Folha", ""]]
    );
}

#[test]
fn test_generated_contract_round_trips() {
    let dir = TempDir::new().unwrap();
    let template = {
        let mut doc = Document::new();
        doc.add_paragraph("CONTRATANTE: [LEGAL_NAME]");
        doc.add_paragraph("CNPJ: [TAX_ID]");
        doc.add_paragraph("Sede: [ADDRESS]");
        save(&mut doc, &dir, "modelo.docx")
    };
    let generator = ContractGenerator::new(&template, dir.path().join("gerados")).unwrap();
    let data = ContractData {
        legal_name: "PADARIA CENTRAL LTDA".into(),
        tax_id: "11.222.333/0001-44".into(),
        address: "Rua do Pão, 7".into(),
    };
    let contract = generator
        .generate(&CompanyRecord::from_contract_data(&data))
        .unwrap();

    let text = extract(&contract.path);
    assert_eq!(
        text,
        "CONTRATANTE: PADARIA CENTRAL LTDA\nCNPJ: 11.222.333/0001-44\nSede: Rua do Pão, 7"
    );

    let rebuilt = reconstruct(&contract.path, &text).unwrap();
    assert!(rebuilt
        .file_name()
        .unwrap()
        .to_string_lossy()
        .ends_with("_edited.docx"));
    assert_eq!(extract(&rebuilt), text);
}
