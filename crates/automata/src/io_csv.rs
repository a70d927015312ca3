#![forbid(unsafe_code)]

use std::fs::File;
use std::io::BufWriter;
use std::io::Read;
use std::io::Write;
use std::path::Path;

use itertools::Itertools;
use log::info;
use streaming_iterator::StreamingIterator;

use forma_io::LineIterator;
use forma_utilities::FormaError;

use crate::ACCEPTING_MARKER;
use crate::Automaton;
use crate::BuildError;
use crate::Dfa;
use crate::DfaBuilder;
use crate::EPSILON;
use crate::INITIAL_MARKER;
use crate::Nfa;
use crate::NfaBuilder;
use crate::StateLabel;
use crate::Symbol;
use crate::is_epsilon;
use crate::parse_marked_label;

// The explicit sentinel for an undefined DFA transition. The DFA reader and
// writer reject a state with this name.
const DEAD_SENTINEL: &str = "DEAD";

/// Loads a DFA in the CSV table format from the given reader.
///
/// # Details
///
/// The first line is the header: the `DFA` kind tag followed by one
/// single-character column per alphabet symbol. Every following non-empty
/// line is one state row: the state label, optionally marked with `>`
/// (initial) and `*` (accepting), then per column either a target state or
/// the `DEAD` sentinel for an undefined transition. The sentinel name is
/// reserved, a state cannot be called `DEAD`.
///
/// ```text
/// DFA,0,1
/// >*f,fn,n
/// *fn,fn,n
/// n,f,n
/// ```
pub fn read_dfa_csv(reader: impl Read) -> Result<Dfa, FormaError> {
    info!("Reading DFA in CSV format...");

    let mut lines = LineIterator::new(reader);
    lines.advance();
    if let Some(error) = lines.take_error() {
        return Err(error.into());
    }
    let header = lines.get().ok_or_else(|| BuildError::MalformedHeader {
        reason: "the first line should be the header".to_string(),
    })?;

    let columns = parse_header(header, "DFA", false)?;

    let mut builder = DfaBuilder::new();
    for &symbol in &columns {
        builder.require_symbol(symbol);
    }

    while let Some(line) = lines.next() {
        if line.is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != columns.len() + 1 {
            return Err(BuildError::MalformedRow {
                line: line.clone(),
                reason: format!("expected {} fields, found {}", columns.len() + 1, fields.len()),
            }
            .into());
        }

        if parse_marked_label(fields[0]).label == DEAD_SENTINEL {
            return Err(BuildError::MalformedRow {
                line: line.clone(),
                reason: format!("'{DEAD_SENTINEL}' is reserved for undefined transitions"),
            }
            .into());
        }

        let mut entries: Vec<(Symbol, Option<StateLabel>)> = Vec::new();
        for (&symbol, &field) in columns.iter().zip(&fields[1..]) {
            if field == DEAD_SENTINEL {
                entries.push((symbol, None));
            } else if field.is_empty() {
                return Err(BuildError::MalformedRow {
                    line: line.clone(),
                    reason: "empty target field".to_string(),
                }
                .into());
            } else {
                entries.push((symbol, Some(field.to_string())));
            }
        }

        builder.add_row(fields[0], entries)?;
    }

    if let Some(error) = lines.take_error() {
        return Err(error.into());
    }

    let dfa = builder.build()?;
    info!("Finished reading a DFA with {} states", dfa.states().len());
    Ok(dfa)
}

/// Loads an NFA in the CSV table format from the given reader.
///
/// # Details
///
/// The same layout as [read_dfa_csv] with the `NFA` kind tag, an optional
/// `ε` column carrying the spontaneous moves, and bracketed space-separated
/// target lists in the fields, `[]` for none.
///
/// ```text
/// NFA,0,1
/// >*f,[f n],[n]
/// n,[f],[n]
/// ```
pub fn read_nfa_csv(reader: impl Read) -> Result<Nfa, FormaError> {
    info!("Reading NFA in CSV format...");

    let mut lines = LineIterator::new(reader);
    lines.advance();
    if let Some(error) = lines.take_error() {
        return Err(error.into());
    }
    let header = lines.get().ok_or_else(|| BuildError::MalformedHeader {
        reason: "the first line should be the header".to_string(),
    })?;

    let columns = parse_header(header, "NFA", true)?;

    let mut builder = NfaBuilder::new();
    for &symbol in &columns {
        builder.require_symbol(symbol);
    }

    while let Some(line) = lines.next() {
        if line.is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != columns.len() + 1 {
            return Err(BuildError::MalformedRow {
                line: line.clone(),
                reason: format!("expected {} fields, found {}", columns.len() + 1, fields.len()),
            }
            .into());
        }

        let mut entries: Vec<(Symbol, Vec<StateLabel>)> = Vec::new();
        for (&symbol, &field) in columns.iter().zip(&fields[1..]) {
            let targets = parse_target_list(field).ok_or_else(|| BuildError::MalformedRow {
                line: line.clone(),
                reason: format!("'{field}' is not a bracketed target list"),
            })?;
            entries.push((symbol, targets));
        }

        builder.add_row(fields[0], entries)?;
    }

    if let Some(error) = lines.take_error() {
        return Err(error.into());
    }

    let nfa = builder.build()?;
    info!("Finished reading an NFA with {} states", nfa.states().len());
    Ok(nfa)
}

/// Writes the DFA in the CSV table format, see [read_dfa_csv].
///
/// The rows are sorted by state label and the initial marker is rendered
/// before the accepting marker, so the output is deterministic. Fails when a
/// state is named like the `DEAD` sentinel.
pub fn write_dfa_csv(writer: &mut impl Write, dfa: &Dfa) -> Result<(), FormaError> {
    info!("Writing DFA in CSV format...");

    if dfa.states().contains(DEAD_SENTINEL) {
        return Err(format!(
            "A state cannot be named '{DEAD_SENTINEL}', the name is reserved for undefined transitions"
        )
        .into());
    }

    let mut writer = BufWriter::new(writer);

    write!(writer, "{}", dfa.kind())?;
    for &symbol in dfa.alphabet() {
        write!(writer, ",{symbol}")?;
    }
    writeln!(writer)?;

    for state in dfa.states().iter() {
        write_marked_label(&mut writer, dfa, state)?;
        for &symbol in dfa.alphabet() {
            match dfa.transition(state, symbol) {
                Some(target) => write!(writer, ",{target}")?,
                None => write!(writer, ",{DEAD_SENTINEL}")?,
            }
        }
        writeln!(writer)?;
    }

    writer.flush()?;
    Ok(())
}

/// Writes the NFA in the CSV table format, see [read_nfa_csv]. The `ε`
/// column is written iff the NFA has epsilon moves.
pub fn write_nfa_csv(writer: &mut impl Write, nfa: &Nfa) -> Result<(), FormaError> {
    info!("Writing NFA in CSV format...");

    let mut writer = BufWriter::new(writer);

    let mut columns: Vec<Symbol> = nfa.alphabet().iter().copied().collect();
    if nfa.has_epsilon_moves() {
        columns.push(EPSILON);
    }

    write!(writer, "{}", nfa.kind())?;
    for &symbol in &columns {
        write!(writer, ",{symbol}")?;
    }
    writeln!(writer)?;

    for state in nfa.states().iter() {
        write_marked_label(&mut writer, nfa, state)?;
        for &symbol in &columns {
            match nfa.targets(state, symbol) {
                Some(targets) => write!(writer, ",[{}]", targets.iter().format(" "))?,
                None => write!(writer, ",[]")?,
            }
        }
        writeln!(writer)?;
    }

    writer.flush()?;
    Ok(())
}

/// Reads a DFA from the CSV file at the given path.
pub fn read_dfa_csv_file(path: impl AsRef<Path>) -> Result<Dfa, FormaError> {
    read_dfa_csv(File::open(path)?)
}

/// Writes the DFA to a CSV file at the given path, replacing an existing
/// file.
pub fn write_dfa_csv_file(path: impl AsRef<Path>, dfa: &Dfa) -> Result<(), FormaError> {
    let mut file = File::create(path)?;
    write_dfa_csv(&mut file, dfa)
}

/// Reads an NFA from the CSV file at the given path.
pub fn read_nfa_csv_file(path: impl AsRef<Path>) -> Result<Nfa, FormaError> {
    read_nfa_csv(File::open(path)?)
}

/// Writes the NFA to a CSV file at the given path, replacing an existing
/// file.
pub fn write_nfa_csv_file(path: impl AsRef<Path>, nfa: &Nfa) -> Result<(), FormaError> {
    let mut file = File::create(path)?;
    write_nfa_csv(&mut file, nfa)
}

/// Parses the header line: the kind tag followed by one single-character
/// column per symbol. The epsilon column is only legal for NFAs.
fn parse_header(line: &str, expected_tag: &str, allow_epsilon: bool) -> Result<Vec<Symbol>, BuildError> {
    let fields: Vec<&str> = line.split(',').collect();
    let Some((&tag, symbol_fields)) = fields.split_first() else {
        return Err(BuildError::MalformedHeader {
            reason: "the header is empty".to_string(),
        });
    };

    if tag != expected_tag {
        return Err(BuildError::MalformedHeader {
            reason: format!("expected the kind tag '{expected_tag}', found '{tag}'"),
        });
    }

    let mut symbols = Vec::new();
    for &field in symbol_fields {
        let mut characters = field.chars();
        let symbol = match (characters.next(), characters.next()) {
            (Some(symbol), None) => symbol,
            _ => {
                return Err(BuildError::MalformedHeader {
                    reason: format!("'{field}' is not a single-character symbol column"),
                });
            }
        };

        if symbols.contains(&symbol) {
            return Err(BuildError::MalformedHeader {
                reason: format!("duplicate symbol column '{symbol}'"),
            });
        }
        if is_epsilon(symbol) && !allow_epsilon {
            return Err(BuildError::MalformedHeader {
                reason: "a DFA cannot have an epsilon column".to_string(),
            });
        }

        symbols.push(symbol);
    }

    Ok(symbols)
}

/// Parses a bracketed space-separated target list, `[f n]` or `[]`.
fn parse_target_list(field: &str) -> Option<Vec<StateLabel>> {
    let inner = field.strip_prefix('[')?.strip_suffix(']')?;
    Some(inner.split_whitespace().map(str::to_string).collect())
}

/// Writes the state label with its markers, `>` before `*`.
fn write_marked_label(
    writer: &mut impl Write,
    automaton: &impl Automaton,
    state: &str,
) -> Result<(), FormaError> {
    if automaton.initial_state() == state {
        write!(writer, "{INITIAL_MARKER}")?;
    }
    if automaton.accepting_states().contains(state) {
        write!(writer, "{ACCEPTING_MARKER}")?;
    }
    write!(writer, "{state}")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use forma_io::DumpFiles;
    use forma_utilities::random_test;

    use super::*;
    use crate::check_equivalent;
    use crate::random_nfa;
    use crate::subset_construction;

    const EXAMPLE_DFA_CSV: &str = "\
DFA,0,1
>*f,fn,n
*fn,fn,n
n,f,n
";

    const EXAMPLE_NFA_CSV: &str = "\
NFA,0,1
>*f,[f n],[n]
n,[f],[n]
";

    #[test]
    fn test_read_dfa_csv() {
        let dfa = read_dfa_csv(EXAMPLE_DFA_CSV.as_bytes()).unwrap();

        assert_eq!(dfa.states(), &["f", "fn", "n"].into_iter().collect());
        assert_eq!(dfa.alphabet().iter().copied().collect::<Vec<_>>(), vec!['0', '1']);
        assert_eq!(dfa.initial_state(), "f");
        assert_eq!(dfa.accepting_states(), &["f", "fn"].into_iter().collect());

        assert!(!dfa.accepts("0100101"));
        assert!(dfa.accepts("01001010"));
    }

    #[test]
    fn test_read_dfa_csv_with_dead_sentinel() {
        let input = "\
DFA,0,1
>a,a,DEAD
";

        let dfa = read_dfa_csv(input.as_bytes()).unwrap();
        assert_eq!(
            dfa.alphabet().iter().copied().collect::<Vec<_>>(),
            vec!['0', '1'],
            "a column of DEAD entries is still part of the alphabet"
        );
        assert_eq!(dfa.transition("a", '1'), None);
    }

    #[test]
    fn test_read_nfa_csv() {
        let nfa = read_nfa_csv(EXAMPLE_NFA_CSV.as_bytes()).unwrap();

        assert_eq!(nfa.states(), &["f", "n"].into_iter().collect());
        assert_eq!(nfa.initial_state(), "f");
        assert_eq!(nfa.targets("f", '0'), Some(&["f", "n"].into_iter().collect()));
        assert!(!nfa.has_epsilon_moves());

        assert!(!nfa.accepts("0100101"));
        assert!(nfa.accepts("01001010"));
    }

    #[test]
    fn test_read_nfa_csv_with_epsilon_column() {
        let input = "\
NFA,0,ε
>a,[],[b]
*b,[b],[]
";

        let nfa = read_nfa_csv(input.as_bytes()).unwrap();
        assert!(nfa.has_epsilon_moves());
        assert_eq!(nfa.alphabet().iter().copied().collect::<Vec<_>>(), vec!['0']);
        assert!(nfa.accepts(""), "a reaches the accepting state b through epsilon");
        assert!(nfa.accepts("00"));
        assert!(!nfa.accepts("1"));
    }

    #[test]
    fn test_read_csv_header_failures() {
        let wrong_tag = "NFA,0,1\n>*f,fn,n\n";
        let error = read_dfa_csv(wrong_tag.as_bytes()).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<BuildError>(),
            Some(BuildError::MalformedHeader { .. })
        ));

        let multi_char_column = "DFA,01\n>f,f\n";
        let error = read_dfa_csv(multi_char_column.as_bytes()).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<BuildError>(),
            Some(BuildError::MalformedHeader { .. })
        ));

        let duplicate_column = "DFA,0,0\n>f,f,f\n";
        assert!(read_dfa_csv(duplicate_column.as_bytes()).is_err());

        let epsilon_in_dfa = "DFA,0,ε\n>f,f,f\n";
        assert!(read_dfa_csv(epsilon_in_dfa.as_bytes()).is_err());

        assert!(read_dfa_csv("".as_bytes()).is_err());
    }

    #[test]
    fn test_read_csv_row_failures() {
        let missing_field = "DFA,0,1\n>f,f\n";
        let error = read_dfa_csv(missing_field.as_bytes()).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<BuildError>(),
            Some(BuildError::MalformedRow { .. })
        ));

        let empty_target = "DFA,0\n>f,\n";
        assert!(read_dfa_csv(empty_target.as_bytes()).is_err());

        let unbracketed_list = "NFA,0\n>f,f n\n";
        let error = read_nfa_csv(unbracketed_list.as_bytes()).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<BuildError>(),
            Some(BuildError::MalformedRow { .. })
        ));
    }

    #[test]
    fn test_read_csv_state_failures() {
        // Both rows strip to the state f.
        let duplicate_rows = "DFA,0\n>f,f\n*f,f\n";
        let error = read_dfa_csv(duplicate_rows.as_bytes()).unwrap_err();
        assert_eq!(
            error.downcast_ref::<BuildError>(),
            Some(&BuildError::DuplicateStateRow {
                state: "f".to_string()
            })
        );

        let no_initial = "DFA,0\nf,f\n";
        let error = read_dfa_csv(no_initial.as_bytes()).unwrap_err();
        assert_eq!(error.downcast_ref::<BuildError>(), Some(&BuildError::MissingInitialState));
    }

    #[test]
    fn test_read_csv_io_failures() {
        // The bytes after the valid first row are not UTF-8.
        let mut input: Vec<u8> = b"DFA,0\n>*a,a\n".to_vec();
        input.extend_from_slice(b"b,\xFF\xFEa\n");

        let error = read_dfa_csv(&input[0..]).unwrap_err();
        assert!(
            error.downcast_ref::<std::io::Error>().is_some(),
            "a read error must not truncate the table"
        );

        let mut input: Vec<u8> = b"NFA,0\n>*a,[a]\n".to_vec();
        input.extend_from_slice(b"b,\xFF\xFE[a]\n");
        assert!(read_nfa_csv(&input[0..]).is_err());
    }

    #[test]
    fn test_dfa_csv_sentinel_is_not_a_state_name() {
        // A state literally named DEAD cannot be told apart from the sentinel.
        let mut builder = DfaBuilder::new();
        builder.set_initial("a");
        builder.add_accepting("DEAD");
        builder.add_transition("a", '0', "DEAD");
        let dfa = builder.build().unwrap();
        assert!(dfa.accepts("0"));

        let mut buffer: Vec<u8> = Vec::new();
        assert!(write_dfa_csv(&mut buffer, &dfa).is_err());

        let input = "DFA,0\n>a,a\n*DEAD,a\n";
        let error = read_dfa_csv(input.as_bytes()).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<BuildError>(),
            Some(BuildError::MalformedRow { .. })
        ));
    }

    #[test]
    fn test_dfa_csv_round_trip() {
        let dfa = read_dfa_csv(EXAMPLE_DFA_CSV.as_bytes()).unwrap();

        let mut buffer: Vec<u8> = Vec::new();
        write_dfa_csv(&mut buffer, &dfa).unwrap();
        assert_eq!(
            String::from_utf8(buffer.clone()).unwrap(),
            EXAMPLE_DFA_CSV,
            "sorted rows and markers make the export deterministic"
        );

        let read_back = read_dfa_csv(&buffer[0..]).unwrap();
        check_equivalent(&dfa, &read_back, 6);
    }

    #[test]
    fn test_nfa_csv_round_trip() {
        let nfa = read_nfa_csv(EXAMPLE_NFA_CSV.as_bytes()).unwrap();

        let mut buffer: Vec<u8> = Vec::new();
        write_nfa_csv(&mut buffer, &nfa).unwrap();
        assert_eq!(String::from_utf8(buffer.clone()).unwrap(), EXAMPLE_NFA_CSV);

        let read_back = read_nfa_csv(&buffer[0..]).unwrap();
        check_equivalent(&nfa, &read_back, 6);
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn test_nfa_csv_file_round_trip() {
        let nfa = read_nfa_csv(EXAMPLE_NFA_CSV.as_bytes()).unwrap();

        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("example.csv");

        write_nfa_csv_file(&path, &nfa).unwrap();
        let read_back = read_nfa_csv_file(&path).unwrap();

        assert_eq!(read_back.states(), nfa.states());
        check_equivalent(&nfa, &read_back, 6);
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn test_random_csv_round_trip() {
        let mut dump = DumpFiles::new("random_csv_round_trip");

        random_test(50, |rng| {
            let nfa = random_nfa(rng, 6, 2, 3, 0.2);

            // The dump of the last iteration is the one that failed.
            dump.dump("nfa.csv", |file| write_nfa_csv(file, &nfa)).unwrap();

            let mut buffer: Vec<u8> = Vec::new();
            write_nfa_csv(&mut buffer, &nfa).unwrap();
            let nfa_read = read_nfa_csv(&buffer[0..]).unwrap();

            assert_eq!(nfa_read.states(), nfa.states());
            assert_eq!(nfa_read.alphabet(), nfa.alphabet());
            check_equivalent(&nfa, &nfa_read, 5);

            let dfa = subset_construction(&nfa);
            let mut buffer: Vec<u8> = Vec::new();
            write_dfa_csv(&mut buffer, &dfa).unwrap();
            let dfa_read = read_dfa_csv(&buffer[0..]).unwrap();

            check_equivalent(&dfa, &dfa_read, 5);
        })
    }
}
