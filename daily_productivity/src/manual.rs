/*!

This is the long-form manual for `daily_productivity` and `enumtally`.

## Input formats

`enumtally` reads the export of a survey collection platform, one row per
interview attempt. The following formats are supported:
* `excel` Excel workbooks (`.xlsx`, `.xlsm`, `.xls`) and OpenDocument spreadsheets (`.ods`)
* `csv` Comma Separated Values

The format is guessed from the extension of the file, or set with the `provider`
field of the configuration.

### `excel`

The first worksheet is used if the workbook has only one. Otherwise, the name of the
worksheet must be given (`--excel-worksheet-name`).

Numbers, booleans, text and dates are read with their types. Dates are read as dates,
date-times keep their time of day until the pipeline cuts it. A cell holding only a
time of day has no date: its row is dropped.

### `csv`

All the cells are read as text. Empty cells are missing values.

```text
enum,village,int_date,consent
Amina,Siaya,2025-09-10,1
Amina,Siaya,2025-09-10,0
Joseph,Kisumu,2025-09-11,yes
```

### Header rows

Some exports carry the names of the columns on more than one row (a group label
above the question label). With `--header-rows 2`, the names of the columns are
assembled from both rows: `interview` above `date` gives the column `interview_date`.

If the same column name appears several times, the later occurrences are renamed with
a `_dup1`, `_dup2`, ... suffix. The renamed columns are reported in the logs, and these
new names are the ones to select.

## Column roles

| role        | flag           | required | canonical name |
|-------------|----------------|----------|----------------|
| enumerator  | `--enumerator` | yes      | `enum`         |
| date        | `--date`       | yes      | `date`         |
| consent     | `--consent`    | no       | `consent`      |
| grouping    | `--grouping`   | no       | `grouping_var` |

The same column cannot be selected for two roles.

Values are cleaned as follows:
- enumerator and grouping: missing values become `Unknown`. A list with one element or a
  map (first value) is flattened. Labelled values use their label.
- date: dates, date-times (cut to the day) and text in one of the common layouts
  (`2025-09-10`, `2025-09-10T14:32:00`, `2025-09-10 14:32:00`, `2025/09/10`,
  `09/10/2025` (month first), `10 Sep 2025`, `10Sep2025`, `Sep 10, 2025 2:32:00 PM`).
  Rows with other values are dropped and counted in the logs.
- consent: `1`, `yes`, `true`, `y` (any case) are `Yes`, everything else is `No`.

## Output

The output has one row per enumerator (and grouping value, and consent status), one
column per date seen in the data, in chronological order, and a `Total` column.

The date headers follow the style given with `--header-style`:

| style     | example       |
|-----------|---------------|
| `pretty`  | `10 Sep 2025` |
| `safe`    | `d_10Sep2025` |
| `compact` | `10Sep2025`   |
| `iso`     | `2025-09-10`  |

With `--out`, a path ending in `.json` produces JSON, anything else produces CSV.
Without it, the CSV is printed on the standard output. `--output-format` forces
one or the other.

The JSON output also carries the diagnostics of the run:

```json
{
  "columns": ["enum", "2025-09-10", "Total"],
  "rows": [["Amina", 2, 2]],
  "diagnostics": {
    "inputRows": 3,
    "validRows": 2,
    "droppedInvalidDates": 1,
    "truncatedTimestamps": 1,
    "renamedColumns": []
  }
}
```

With `--reference`, the output is compared with a previous summary, and the
differences are printed.

## Configuration

All the options can also be provided in a JSON configuration file (`--config`).
Command line flags take precedence over the configuration file. Paths are relative to the
configuration file.

```json
{
  "input": {
    "filePath": "export.xlsx",
    "provider": "excel",
    "excelWorksheetName": "data",
    "headerRows": 1
  },
  "columns": {
    "enumerator": "enum_lab",
    "date": "SubmissionDate",
    "consent": "consent",
    "groupingVar": ""
  },
  "output": {
    "headerStyle": "pretty",
    "outputPath": "daily_survey_productivity.csv"
  }
}
```

An empty string for `consent` or `groupingVar` means that no column is selected.

 */
