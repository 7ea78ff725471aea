//! Help text for CLI commands.

/// Get help text for CLI commands.
#[must_use]
pub const fn help_text() -> &'static str {
    r#"prom-window-report: windowed Prometheus reports and CSV chart merging

Commands:

  analyze [options]   Query Prometheus over consecutive windows and report
    --url URL           Prometheus base URL (or PROMETHEUS_URL)
    --token TOKEN       Bearer token (or PROMETHEUS_TOKEN)
    --date DATE         Start of the first window, "DD/MM/YYYY HH:MM:SS" or
                        "DD/MM/YYYY" (UTC). Without it, the last 24h are shown
    --days, -d N        Number of windows (default: 3)
    --window-hours H    Window length in hours (default: 24)
    --day-labels LIST   Comma-separated labels, one per window
    --hub               Hub profile: bucket usage and observability namespace
                        resources (default)
    --spoke             Spoke profile: observability add-on namespace resources
    --namespace, -n NS  Also report CPU, memory and network for NS
    --bucket NAME       Object bucket to report (default: observability)
    --filter-incomplete Drop windows whose data starts late (retention gaps)
    --csv               Also export each series as CSV

  combine FILE... [options]
                      Merge CSV exports into one deduplicated chart
    --output, -o PATH   Chart path (default: combined_graph.png)
    --title, -t TITLE   Chart title
    --days LIST         Comma-separated day separator labels
    --date DATE         Align the x-axis to this start date
    --csv               Also export the combined series as CSV

  help, -h, --help    Show this message

Environment:
  PROMETHEUS_URL, PROMETHEUS_TOKEN, LOG_LEVEL (default: info),
  REQUEST_TIMEOUT_MS (default: 30000), PROMETHEUS_INSECURE_TLS (default: true),
  OUTPUT_DIR (default: ./results), REPORT_PREFIX (default: report),
  CHART_FONT_PATH

Getting the URL and token on OpenShift:
  oc get route prometheus-k8s -n openshift-monitoring -o jsonpath='{.spec.host}'
  oc whoami -t

Examples:
  prom-window-report analyze --url https://prometheus-k8s.apps.example.com \
    --token "$(oc whoami -t)" --date "15/01/2024 00:00:00" --days 3
  prom-window-report analyze --spoke --date "15/01/2024" --csv
  prom-window-report combine day1.csv day2.csv -o results/combined.png \
    --date "12/10/2025 08:00:00" --days "Install,Test,Monitor"
"#
}
