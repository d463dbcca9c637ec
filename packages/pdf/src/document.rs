//! Document orchestrator.
//!
//! Runs the component extractors over each page in order and merges their
//! output into one [`CaseRecord`]. Scalar fields keep the first non-empty
//! value seen; occupants and rounds accumulate. All cross-page state lives
//! in a [`DocumentRun`], so pages can be fed one at a time as they load.

use maegak_pdf_models::{CaseRecord, Document, Page, Table, keep_first};

use crate::config::ExtractConfig;
use crate::fields::next_cell_after_label;
use crate::occupants::{OccupantDecoder, PageCarryState};
use crate::patterns::find_case_number;
use crate::positioned::{self, PositionedCarry};
use crate::rounds::scan_rounds;
use crate::sections::{SectionState, accumulate};

/// Extracts [`CaseRecord`]s with one configuration.
#[derive(Debug, Clone)]
pub struct Extractor {
    config: ExtractConfig,
}

impl Extractor {
    /// Creates an extractor.
    #[must_use]
    pub const fn new(config: ExtractConfig) -> Self {
        Self { config }
    }

    /// Starts a run for one document.
    #[must_use]
    pub fn start(&self) -> DocumentRun<'_> {
        DocumentRun {
            config: &self.config,
            record: CaseRecord::default(),
            occupant_carry: PageCarryState::default(),
            section_state: SectionState::default(),
            positioned_carry: PositionedCarry::default(),
            case_no_in_text: None,
        }
    }

    /// Extracts a record from a fully loaded document.
    #[must_use]
    pub fn extract(&self, document: &Document) -> CaseRecord {
        let mut run = self.start();
        for page in &document.pages {
            run.process_page(page);
        }
        run.finish()
    }
}

/// Accumulated state while one document is being processed.
#[derive(Debug)]
pub struct DocumentRun<'a> {
    config: &'a ExtractConfig,
    record: CaseRecord,
    occupant_carry: PageCarryState,
    section_state: SectionState,
    positioned_carry: PositionedCarry,
    case_no_in_text: Option<String>,
}

impl DocumentRun<'_> {
    /// Processes the next page in document order.
    pub fn process_page(&mut self, page: &Page) {
        if page.is_empty() {
            log::debug!("Page {} is empty; skipping", page.index);
            return;
        }

        self.occupant_carry = std::mem::take(&mut self.occupant_carry).turn_page();

        for round in scan_rounds(&page.text) {
            self.record.push_round(round);
        }
        if self.case_no_in_text.is_none() {
            self.case_no_in_text = find_case_number(&page.text).map(str::to_owned);
        }

        for table in &page.tables {
            self.process_table(table);
        }

        if page.tables.is_empty() && !page.lines.is_empty() {
            positioned::extract_fields(&page.lines, &self.config.positioned.fields, &mut self.record);
            self.positioned_carry = positioned::decode_occupants(
                &page.lines,
                &self.config.positioned.occupants,
                std::mem::take(&mut self.positioned_carry),
                &mut self.record.occupants,
            );
        }

        log::debug!(
            "Page {} done: {} occupants, {} rounds so far",
            page.index,
            self.record.occupants.len(),
            self.record.auction_rounds.len()
        );
    }

    fn process_table(&mut self, table: &Table) {
        let rows = &table.rows;
        let wide = table.width() >= self.config.min_table_width;

        if wide {
            for field in &self.config.table_fields {
                if let Some(value) = next_cell_after_label(rows, &field.label) {
                    keep_first(field.target.slot(&mut self.record), value);
                }
            }
        }

        let (text, state) = accumulate(rows, self.section_state, &self.config.sections);
        text.merge_into(&mut self.record);
        self.section_state = state;

        if wide {
            let decoder = OccupantDecoder::new(&self.config.occupants, &self.config.layouts);
            self.occupant_carry = decoder.decode_table(
                rows,
                std::mem::take(&mut self.occupant_carry),
                &mut self.record.occupants,
            );
        }
    }

    /// Completes the run: falls back to a case number found in the raw
    /// text when no labelled one was found, then sanitises if configured.
    #[must_use]
    pub fn finish(mut self) -> CaseRecord {
        if let Some(case_no) = &self.case_no_in_text {
            keep_first(&mut self.record.case_no, case_no);
        }
        if self.config.sanitize_output {
            self.record.sanitize();
        }
        self.record
    }
}

#[cfg(test)]
mod tests {
    use maegak_pdf_models::{PositionedLine, Row};

    use super::*;

    fn row(cells: &[&str]) -> Row {
        let mut row: Row = cells.iter().map(|c| (*c).to_string()).collect();
        row.resize(14, String::new());
        row
    }

    fn table_page(index: usize, rows: Vec<Row>, text: &str) -> Page {
        Page {
            index,
            tables: vec![Table::new(rows)],
            lines: Vec::new(),
            text: text.to_owned(),
        }
    }

    fn extractor() -> Extractor {
        Extractor::new(ExtractConfig::embedded().unwrap())
    }

    fn sample() -> Document {
        let mut occupant = row(&["홍길동", "", "3층", "현황조사", "", "주거 임차인", "2020.01.01~"]);
        occupant[7] = "5,000,000".to_owned();
        occupant[11] = "2020.01.02".to_owned();

        Document {
            pages: vec![
                table_page(
                    0,
                    vec![
                        row(&["사건", "", "2025타경100211 부동산강제경매", "", "매각물건번호", "1"]),
                        row(&["작성 일자", "", "2025.06.02", "", "최선순위 설정", "2023.10.16. 근저당권"]),
                        row(&["배당요구종기", "", "2025.03.10"]),
                        row(&["점유자 성명", "점유부분", "정보출처"]),
                        occupant,
                        row(&["<비고>"]),
                        row(&["임차인 홍길동은 배당요구함"]),
                    ],
                    "1회 2025.07.01 100,000,000 10,000,000",
                ),
                table_page(
                    1,
                    vec![
                        row(&["사건", "", "2099타경1"]),
                        row(&["등기된 부동산에 관한 권리 또는 가처분으로 매각으로 그 효력이 소멸되지 아니하는 것"]),
                        row(&["해당사항 없음"]),
                        row(&["비고란"]),
                        row(&["일괄매각"]),
                    ],
                    "1회 2025.07.01 100,000,000\n2회 2025.08.05 80,000,000 8,000,000",
                ),
            ],
        }
    }

    #[test]
    fn merges_pages_into_one_record() {
        let record = extractor().extract(&sample());

        assert_eq!(record.case_no, "2025타경100211 부동산강제경매");
        assert_eq!(record.item_no, "1");
        assert_eq!(record.document_date, "2025.06.02");
        assert_eq!(record.priority_date, "2023.10.16. 근저당권");
        assert_eq!(record.dividend_end_date, "2025.03.10");

        assert_eq!(record.occupants.len(), 1);
        assert_eq!(record.occupants[0].name, "홍길동");
        assert_eq!(record.occupants[0].deposit, "5000000");
        assert_eq!(record.occupants[0].move_in_date, "2020.01.02");

        assert_eq!(record.tenant_note, "임차인 홍길동은 배당요구함");
        assert_eq!(record.surviving_rights, "해당사항 없음");
        assert_eq!(record.general_note, "일괄매각");

        assert_eq!(record.auction_rounds.len(), 2);
        assert_eq!(record.auction_rounds[0].bid_deposit, "10000000");
        assert_eq!(record.auction_rounds[1].round_no, "2회");
    }

    #[test]
    fn extraction_is_idempotent() {
        let extractor = extractor();
        let document = sample();
        assert_eq!(extractor.extract(&document), extractor.extract(&document));
    }

    #[test]
    fn narrow_tables_only_feed_sections() {
        let document = Document {
            pages: vec![table_page(
                0,
                vec![
                    vec!["사건".to_owned(), "2025타경1".to_owned()],
                    vec!["<비고>".to_owned()],
                    vec!["메모".to_owned()],
                ],
                "",
            )],
        };
        let record = extractor().extract(&document);
        assert_eq!(record.case_no, "");
        assert_eq!(record.tenant_note, "메모");
    }

    #[test]
    fn case_number_falls_back_to_page_text() {
        let document = Document {
            pages: vec![table_page(0, vec![row(&["제목"])], "서울중앙지방법원 2024타경5678 매각물건명세서")],
        };
        assert_eq!(extractor().extract(&document).case_no, "2024타경5678");
    }

    #[test]
    fn positioned_page_without_tables() {
        let document = Document {
            pages: vec![Page {
                index: 0,
                tables: Vec::new(),
                lines: vec![
                    PositionedLine::new("사건", 20.0, 40.0),
                    PositionedLine::new("2025타경100211", 60.0, 40.0),
                    PositionedLine::new("담임법관", 380.0, 40.0),
                    PositionedLine::new("김판사", 440.0, 55.0),
                    PositionedLine::new("점유자", 35.0, 300.0),
                    PositionedLine::new("홍길동", 35.0, 370.0),
                    PositionedLine::new("현황조사", 95.0, 370.0),
                    PositionedLine::new("<비고>", 35.0, 500.0),
                    PositionedLine::new("조사된 임차내역 없음", 35.0, 515.0),
                ],
                text: String::new(),
            }],
        };
        let record = extractor().extract(&document);
        assert_eq!(record.case_no, "2025타경100211");
        assert_eq!(record.judge, "김판사");
        assert_eq!(record.occupants.len(), 1);
        assert_eq!(record.occupants[0].info_source, "현황조사");
        assert_eq!(record.tenant_note, "조사된 임차내역 없음");
    }

    #[test]
    fn empty_pages_are_skipped() {
        let document = Document {
            pages: vec![Page::default()],
        };
        assert_eq!(extractor().extract(&document), CaseRecord::default());
    }
}
