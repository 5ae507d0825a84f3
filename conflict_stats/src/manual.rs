/*!

This is the long-form manual for `conflict_stats` and `acledash`.

## Input formats

The following formats are supported:
* `xlsx` Excel workbook, as distributed by the ACLED curated data files
* `csv` Comma Separated Values, as produced by the ACLED export tool

In both cases the first row holds the column names. The columns can be in any order.
Only `event_id_cnty`, `event_date`, `country`, `disorder_type` and `event_type` are
required. The `xlsx` format requires the `excel` feature, which is enabled by default.

### Columns

- `event_id_cnty`: a unique identifier for the event within the country, combining the
  country code and event ID.
- `event_date`: the date when the event occurred. Excel dates, `2024-01-05` and
  `05 January 2024` are accepted.
- `year`: the year of the event. Derived from `event_date` when missing or blank.
- `time_precision`: the precision of the event date:
  - 1 = exact date
  - 2 = approximate date (within a few days)
  - 3 = aggregated to a period (a week or a month).
- `disorder_type`: the type of disorder, such as "Political violence" or "Demonstrations".
- `event_type`: general categorization of the event, like "Riots", "Protests" or
  "Violence against civilians".
- `sub_event_type`: further detail about the event type (e.g. "Mob violence").
- `actor1`, `assoc_actor_1`, `inter1`: the main actor initiating the event, an associated
  actor and the interaction code of the main actor.
- `actor2`, `assoc_actor_2`, `inter2`: the same for the secondary actor.
- `interaction`: the code combining the types of both actors.
- `civilian_targeting`: filled in when civilians were targeted.
- `iso`, `region`, `country`, `admin1`, `admin2`, `admin3`: the location hierarchy.
- `location`, `latitude`, `longitude`, `geo_precision`: the place of the event.
  Events with missing or out of range coordinates are not shown on the map.
- `source`, `source_scale`, `notes`: reporting sources and free text.
- `fatalities`: the number of reported fatalities. Optional.
- `civilian_fatalities`: the number of civilian fatalities. Optional. When the column is
  absent, the corresponding statistics and charts are omitted.

## Filters

- `country`: `Israel`, `Palestine` or `Both` (default).
- `fromYear`, `toYear`: inclusive bounds. Default to the first and last year present for
  the selected country.
- `disorderTypes`, `eventTypes`: the accepted values. Default to all the values present
  for the selected country and years.

## Configuration

`acledash` accepts a JSON configuration file with the `--config` flag:

```json
{
  "inputSettings": {
    "filePath": "Israel-Palestine.xlsx",
    "provider": "xlsx",
    "excelWorksheetName": "Sheet1"
  },
  "filters": {
    "country": "Both",
    "fromYear": 2016,
    "toYear": 2024,
    "eventTypes": ["Riots", "Protests"]
  },
  "outputSettings": {
    "outputPath": "dashboard.json",
    "includeRows": false,
    "topLocations": 20
  }
}
```

All the fields are optional. Relative paths are resolved against the directory of the
configuration file. Command line flags take precedence over the configuration file.

## Interactive mode

With `--interactive`, `acledash` keeps the table in memory and reads one `filters` object
(as above) per line on the standard input. Each line produces one line of JSON output.

*/
