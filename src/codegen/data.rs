//! Emits the pandas code that loads a data file and binds column variables.

use tracing::debug;

use super::columns::parse_column_indices;
use crate::{
    settings::{DataFormat, DataSource},
    utils::{py_int_list, py_quote, py_str_list, sanitize_identifier},
};

/// Imports the loading code for `source` depends on.
pub fn data_imports(source: &DataSource) -> Vec<String> {
    let mut imports = vec!["import pandas as pd".to_string()];
    match source.format {
        DataFormat::Json => imports.push("import json".into()),
        DataFormat::Text => imports.push("import numpy as np".into()),
        _ => {}
    }
    imports
}

/// Source text that loads `source` into `df`/`data` and binds `columns`,
/// `x_data`/`y_data` and one variable per named column.
pub fn data_loading_code(source: &DataSource) -> String {
    let data_path = source.path.to_string_lossy().replace('\\', "/");
    let x_indices = parse_column_indices(&source.x_columns);
    let y_indices = parse_column_indices(&source.y_columns);
    let date_indices = parse_column_indices(&source.date_columns);
    debug!(?x_indices, ?y_indices, ?date_indices, names = ?source.column_names, "column selection");

    let mut lines: Vec<String> = Vec::new();
    let header = match source.header_row {
        Some(row) => format!("header={}", row),
        None => "header=None".to_string(),
    };

    match source.format {
        DataFormat::Csv => {
            let mut params = vec![
                format!("r'{}'", data_path),
                format!("delimiter='{}'", py_quote(&source.delimiter)),
                header,
            ];
            if !date_indices.is_empty() {
                params.push(format!("parse_dates={}", py_int_list(&date_indices)));
                if !source.date_format.is_empty() {
                    lines.push(format!(
                        "_date_parser = lambda x: pd.to_datetime(x, format='{}')",
                        py_quote(&source.date_format)
                    ));
                    params.push("date_parser=_date_parser".to_string());
                }
            }
            if !source.column_names.is_empty() && !source.load_all_columns {
                params.push(format!("usecols={}", py_str_list(&source.column_names)));
            }
            lines.push(format!("df = pd.read_csv({})", params.join(", ")));
        }
        DataFormat::Excel => {
            let mut params = vec![format!("r'{}'", data_path), header];
            if !date_indices.is_empty() {
                params.push(format!("parse_dates={}", py_int_list(&date_indices)));
            }
            lines.push(format!("df = pd.read_excel({})", params.join(", ")));
        }
        DataFormat::Json => {
            lines.push(format!("with open(r'{}', 'r') as f:", data_path));
            lines.push("    _json_data = json.load(f)".into());
            lines.push("if isinstance(_json_data, list):".into());
            lines.push("    df = pd.DataFrame(_json_data)".into());
            lines.push("elif isinstance(_json_data, dict):".into());
            lines.push("    df = pd.DataFrame(_json_data)".into());
            lines.push("else:".into());
            lines.push("    df = pd.DataFrame([_json_data])".into());
        }
        DataFormat::Text => {
            let skip_rows = source.header_row.map(|row| u64::from(row) + 1).unwrap_or(0);
            lines.push(format!("_raw_data = np.loadtxt(r'{}', skiprows={})", data_path, skip_rows));
            lines.push("df = pd.DataFrame(_raw_data)".into());
        }
    }

    lines.push(String::new());
    lines.push("# Make dataframe available as 'data'".into());
    lines.push("data = df".into());
    lines.push(String::new());
    lines.push("# Column data extraction".into());
    lines.push("columns = {}".into());

    if source.load_all_columns {
        lines.push("# All columns loaded into dictionary".into());
        lines.push("for i, col in enumerate(df.columns):".into());
        lines.push("    columns[f'col_{i}'] = df.iloc[:, i].values".into());
        lines.push("    columns[str(col)] = df.iloc[:, i].values".into());
    } else {
        bind_axis(&mut lines, "x", &x_indices);
        bind_axis(&mut lines, "y", &y_indices);
        for (i, idx) in x_indices.iter().enumerate() {
            lines.push(format!("columns['x{}'] = df.iloc[:, {}].values", i, idx));
        }
        for (i, idx) in y_indices.iter().enumerate() {
            lines.push(format!("columns['y{}'] = df.iloc[:, {}].values", i, idx));
        }
    }

    if !source.column_names.is_empty() {
        lines.push(String::new());
        lines.push("# Named column access".into());
        for name in &source.column_names {
            let quoted = py_quote(name);
            lines.push("try:".into());
            lines.push(format!("    {} = df['{}'].values", sanitize_identifier(name), quoted));
            lines.push("except KeyError:".into());
            lines.push(format!("    pass  # Column '{}' not found", quoted));
        }
    }

    lines.push(String::new());
    lines.push("# Data info for debugging".into());
    lines.push("print(f'Loaded data shape: {df.shape}')".into());
    lines.push("print(f'Columns: {list(df.columns)}')".into());

    lines.join("\n")
}

/// `x_data` is one array for a single index, a list of arrays otherwise.
fn bind_axis(lines: &mut Vec<String>, axis: &str, indices: &[usize]) {
    match indices {
        [] => {}
        [idx] => lines.push(format!("{}_data = df.iloc[:, {}].values", axis, idx)),
        many => {
            lines.push(format!(
                "{}_data = [df.iloc[:, i].values for i in {}]",
                axis,
                py_int_list(many)
            ));
            lines.push(format!("{}_columns = {}_data  # List of {} column arrays", axis, axis, axis.to_uppercase()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn csv_source() -> DataSource {
        DataSource {
            path: PathBuf::from("/data/sales.csv"),
            format: DataFormat::Csv,
            delimiter: ",".into(),
            header_row: Some(0),
            x_columns: "0".into(),
            y_columns: "1".into(),
            column_names: Vec::new(),
            load_all_columns: false,
            date_columns: String::new(),
            date_format: "%Y-%m-%d".into(),
        }
    }

    #[test]
    fn csv_with_header_binds_single_columns() {
        let code = data_loading_code(&csv_source());
        assert!(code.contains("df = pd.read_csv(r'/data/sales.csv', delimiter=',', header=0)"));
        assert!(code.contains("data = df"));
        assert!(code.contains("x_data = df.iloc[:, 0].values"));
        assert!(code.contains("y_data = df.iloc[:, 1].values"));
        assert!(code.contains("columns['x0'] = df.iloc[:, 0].values"));
        assert!(code.contains("columns['y0'] = df.iloc[:, 1].values"));
        assert!(!code.contains("x_columns"));
    }

    #[test]
    fn headerless_csv_with_dates_and_names() {
        let mut src = csv_source();
        src.header_row = None;
        src.delimiter = ";".into();
        src.date_columns = "0".into();
        src.column_names = vec!["Sales ($)".into()];
        let code = data_loading_code(&src);
        assert!(code.contains("_date_parser = lambda x: pd.to_datetime(x, format='%Y-%m-%d')"));
        assert!(code.contains(
            "pd.read_csv(r'/data/sales.csv', delimiter=';', header=None, parse_dates=[0], date_parser=_date_parser, usecols=['Sales ($)'])"
        ));
        assert!(code.contains("    Sales____ = df['Sales ($)'].values"));
        assert!(code.contains("except KeyError:"));
        // the parser must be defined before it is used
        let def = code.find("_date_parser =").unwrap();
        let usage = code.find("date_parser=_date_parser").unwrap();
        assert!(def < usage);
    }

    #[test]
    fn multiple_columns_become_lists() {
        let mut src = csv_source();
        src.y_columns = "1-3".into();
        let code = data_loading_code(&src);
        assert!(code.contains("y_data = [df.iloc[:, i].values for i in [1, 2, 3]]"));
        assert!(code.contains("y_columns = y_data"));
        assert!(code.contains("columns['y2'] = df.iloc[:, 3].values"));
    }

    #[test]
    fn load_all_columns_keys_by_position_and_label() {
        let mut src = csv_source();
        src.load_all_columns = true;
        src.column_names = vec!["Model".into()];
        let code = data_loading_code(&src);
        assert!(code.contains("columns[f'col_{i}'] = df.iloc[:, i].values"));
        assert!(code.contains("columns[str(col)] = df.iloc[:, i].values"));
        assert!(!code.contains("x_data"));
        assert!(!code.contains("usecols"));
        assert!(code.contains("Model = df['Model'].values"));
    }

    #[test]
    fn json_handles_list_and_object_roots() {
        let mut src = csv_source();
        src.format = DataFormat::Json;
        let code = data_loading_code(&src);
        assert!(code.contains("_json_data = json.load(f)"));
        assert!(code.contains("if isinstance(_json_data, list):"));
        assert!(code.contains("elif isinstance(_json_data, dict):"));
        assert!(code.contains("df = pd.DataFrame([_json_data])"));
    }

    #[test]
    fn text_skips_header_rows() {
        let mut src = csv_source();
        src.format = DataFormat::Text;
        src.header_row = Some(2);
        assert!(data_loading_code(&src).contains("np.loadtxt(r'/data/sales.csv', skiprows=3)"));
        src.header_row = None;
        assert!(data_loading_code(&src).contains("skiprows=0)"));
    }

    #[test]
    fn imports_follow_the_format() {
        let mut src = csv_source();
        assert_eq!(data_imports(&src), vec!["import pandas as pd"]);
        src.format = DataFormat::Json;
        assert_eq!(data_imports(&src), vec!["import pandas as pd", "import json"]);
        src.format = DataFormat::Text;
        assert_eq!(data_imports(&src), vec!["import pandas as pd", "import numpy as np"]);
    }

    #[test]
    fn text_header_row_at_the_limit() {
        let mut src = csv_source();
        src.format = DataFormat::Text;
        src.header_row = Some(u32::MAX);
        assert!(data_loading_code(&src).contains("skiprows=4294967296)"));
    }

    #[test]
    fn excel_uses_header_row() {
        let mut src = csv_source();
        src.format = DataFormat::Excel;
        src.header_row = Some(1);
        src.date_columns = "2,3".into();
        assert!(data_loading_code(&src)
            .contains("df = pd.read_excel(r'/data/sales.csv', header=1, parse_dates=[2, 3])"));
    }

    #[test]
    fn windows_paths_use_forward_slashes() {
        let mut src = csv_source();
        src.path = PathBuf::from("C:\\data\\x.csv");
        assert!(data_loading_code(&src).contains("r'C:/data/x.csv'"));
    }

    #[test]
    fn malformed_selection_is_partial() {
        let mut src = csv_source();
        src.x_columns = "3-1".into();
        let code = data_loading_code(&src);
        assert!(!code.contains("x_data"));
        assert!(code.contains("y_data = df.iloc[:, 1].values"));
    }
}
