use crate::models::WorkoutType;
use crate::theme::Theme;

pub fn render_index(theme: Theme, weekly_target_minutes: u32) -> String {
    let body_class = if theme.is_dark() { "dark-mode" } else { "" };
    let options = WorkoutType::ALL
        .iter()
        .map(|kind| format!(r#"<option value="{0}">{0}</option>"#, kind.label()))
        .collect::<Vec<_>>()
        .join("");

    INDEX_HTML
        .replace("{{BODY_CLASS}}", body_class)
        .replace("{{TYPE_OPTIONS}}", &options)
        .replace("{{TARGET}}", &weekly_target_minutes.to_string())
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Workout Tracker</title>
  <style>
    :root {
      --bg: #f3f4f6;
      --card: #ffffff;
      --ink: #111827;
      --subtext: #6b7280;
      --border: #e5e7eb;
      --accent: #3b82f6;
      --success: #10b981;
      --danger: #dc2626;
      --progress-bg: #e5e7eb;
    }

    body.dark-mode {
      --bg: #111827;
      --card: #1f2937;
      --ink: #ffffff;
      --subtext: #9ca3af;
      --border: #374151;
      --accent: #60a5fa;
      --success: #34d399;
      --progress-bg: #374151;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Inter", "Segoe UI", sans-serif;
    }

    header {
      display: flex;
      align-items: center;
      justify-content: space-between;
      padding: 16px 28px;
      background: var(--card);
      border-bottom: 1px solid var(--border);
    }

    header h1 {
      margin: 0;
      font-size: 1.4rem;
    }

    nav {
      display: flex;
      gap: 8px;
    }

    button {
      border: none;
      border-radius: 8px;
      padding: 8px 14px;
      font-weight: 600;
      cursor: pointer;
      background: var(--accent);
      color: white;
    }

    button.ghost {
      background: transparent;
      color: var(--ink);
      border: 1px solid var(--border);
    }

    button.danger {
      background: var(--danger);
    }

    button:disabled {
      opacity: 0.4;
      cursor: default;
    }

    main {
      width: min(960px, 100%);
      margin: 0 auto;
      padding: 28px 18px;
      display: grid;
      gap: 24px;
    }

    .card {
      background: var(--card);
      border: 1px solid var(--border);
      border-radius: 14px;
      padding: 20px;
    }

    .hidden {
      display: none !important;
    }

    form {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(180px, 1fr));
      gap: 12px;
      align-items: end;
    }

    label {
      display: grid;
      gap: 6px;
      font-size: 0.85rem;
      color: var(--subtext);
    }

    input, select {
      padding: 8px 10px;
      border-radius: 8px;
      border: 1px solid var(--border);
      font-size: 0.95rem;
    }

    .errors {
      color: var(--danger);
      margin: 12px 0 0;
    }

    .toolbar {
      display: flex;
      flex-wrap: wrap;
      gap: 12px;
      margin-bottom: 12px;
    }

    table {
      width: 100%;
      border-collapse: collapse;
    }

    th, td {
      text-align: left;
      padding: 10px 8px;
      border-bottom: 1px solid var(--border);
    }

    th {
      color: var(--subtext);
      font-size: 0.8rem;
      text-transform: uppercase;
      letter-spacing: 0.08em;
    }

    .pager {
      display: flex;
      align-items: center;
      justify-content: flex-end;
      gap: 12px;
      margin-top: 12px;
    }

    .stats-layout {
      display: grid;
      grid-template-columns: 220px 1fr;
      gap: 20px;
    }

    .user-picker {
      display: grid;
      gap: 6px;
      align-content: start;
    }

    .user-picker button.active {
      background: var(--accent);
      color: white;
    }

    .chart-card {
      background: white;
      border-radius: 12px;
      padding: 12px;
    }

    #chart {
      width: 100%;
      height: 280px;
      display: block;
    }

    .progress-ring circle {
      fill: none;
      stroke-width: 14;
    }

    .tooltip {
      font-size: 0.85rem;
      color: var(--subtext);
      background: var(--bg);
      border-radius: 8px;
      padding: 8px 12px;
    }

    .muted {
      color: var(--subtext);
    }
  </style>
</head>
<body class="{{BODY_CLASS}}">
  <header>
    <h1>Workout Tracker</h1>
    <nav>
      <button class="ghost" data-view="home">Home</button>
      <button class="ghost" data-view="workouts">Workouts</button>
      <button class="ghost" id="stats-toggle">Stats</button>
      <button class="ghost" id="theme-toggle">Toggle theme</button>
    </nav>
  </header>

  <main>
    <section id="home-view" class="card">
      <h2>Welcome</h2>
      <p class="muted">Log your workouts, then open Stats to see minutes per type and progress toward a {{TARGET}} minute weekly target.</p>
    </section>

    <section id="workouts-view" class="hidden">
      <div class="card">
        <h2>Add workout</h2>
        <form id="workout-form">
          <label>Name
            <input name="name" autocomplete="off" />
          </label>
          <label>Type
            <select name="type">
              <option value="">Select type</option>
              {{TYPE_OPTIONS}}
            </select>
          </label>
          <label>Minutes
            <input name="minutes" type="number" min="1" />
          </label>
          <button type="submit">Add</button>
        </form>
        <ul class="errors" id="form-errors"></ul>
      </div>

      <div class="card">
        <div class="toolbar">
          <input id="search" placeholder="Search name or type" />
          <select id="filter-type">
            <option value="">All types</option>
            {{TYPE_OPTIONS}}
          </select>
        </div>
        <table>
          <thead>
            <tr><th>Name</th><th>Workouts</th><th>Total minutes</th><th></th></tr>
          </thead>
          <tbody id="user-rows"></tbody>
        </table>
        <div class="pager">
          <button class="ghost" id="prev-page">Previous</button>
          <span id="page-label" class="muted"></span>
          <button class="ghost" id="next-page">Next</button>
        </div>
      </div>
    </section>

    <section id="stats-view" class="card hidden">
      <div class="toolbar">
        <h2 style="margin: 0; flex: 1">Stats</h2>
        <button class="ghost" id="stats-mode">Switch view</button>
      </div>
      <div id="help-tooltip" class="tooltip hidden">
        Pick a user on the left. Switch between the bar chart and the weekly progress ring.
        <button class="ghost" id="tooltip-close">Got it</button>
      </div>
      <div class="stats-layout">
        <div class="user-picker" id="user-picker"></div>
        <div>
          <p id="stats-summary" class="muted"></p>
          <div id="chart-panel" class="chart-card">
            <svg id="chart" viewBox="0 0 640 280" role="img" aria-label="Minutes per workout type"></svg>
          </div>
          <div id="circular-panel" class="hidden">
            <svg class="progress-ring" width="180" height="180" viewBox="0 0 180 180">
              <circle id="ring-bg" cx="90" cy="90" r="70" />
              <circle id="ring-fg" cx="90" cy="90" r="70" transform="rotate(-90 90 90)" />
              <text id="ring-label" x="90" y="98" text-anchor="middle" font-size="26" fill="currentColor"></text>
            </svg>
          </div>
        </div>
      </div>
    </section>
  </main>

  <script>
    const $ = (id) => document.getElementById(id);
    let users = [];
    let view = null;
    let chartId = null;
    let chartRevision = 0;

    const api = async (method, url, body) => {
      const res = await fetch(url, {
        method,
        headers: body ? { 'content-type': 'application/json' } : {},
        body: body ? JSON.stringify(body) : undefined
      });
      if (res.status === 204) {
        return null;
      }
      const data = await res.json().catch(() => null);
      if (!res.ok) {
        const err = new Error((data && data.error) || 'Request failed');
        err.status = res.status;
        err.errors = (data && data.errors) || [];
        throw err;
      }
      return data;
    };

    const applyTheme = (theme) => {
      document.body.classList.toggle('dark-mode', theme.theme === 'dark');
      $('ring-bg').style.stroke = theme.colors.progress_background;
      $('ring-fg').style.stroke = theme.colors.success;
    };

    const renderList = (page) => {
      const rows = $('user-rows');
      rows.innerHTML = '';
      page.users.forEach((user) => {
        const tr = document.createElement('tr');
        [user.name, user.workout_types, user.total_minutes].forEach((value) => {
          const td = document.createElement('td');
          td.textContent = value;
          tr.appendChild(td);
        });
        const action = document.createElement('td');
        const remove = document.createElement('button');
        remove.className = 'danger';
        remove.textContent = 'Delete';
        remove.addEventListener('click', () => deleteUser(user.id));
        action.appendChild(remove);
        tr.appendChild(action);
        rows.appendChild(tr);
      });
      const pages = Math.max(1, Math.ceil(page.total / page.page_size));
      $('page-label').textContent = `Page ${page.page} of ${pages}`;
      $('prev-page').disabled = !page.has_previous;
      $('next-page').disabled = !page.has_next;
    };

    const destroyChart = () => {
      $('chart').innerHTML = '';
      chartId = null;
      chartRevision = 0;
    };

    const drawChart = (chart) => {
      destroyChart();
      const svg = $('chart');
      const ns = 'http://www.w3.org/2000/svg';
      const width = 640;
      const height = 280;
      const pad = 36;
      const max = Math.max(...chart.data.values, 1);
      const slot = (width - pad * 2) / Math.max(chart.data.values.length, 1);

      for (let i = 0; i <= 4; i++) {
        const y = height - pad - ((height - pad * 2) * i) / 4;
        const line = document.createElementNS(ns, 'line');
        line.setAttribute('x1', pad);
        line.setAttribute('x2', width - pad);
        line.setAttribute('y1', y);
        line.setAttribute('y2', y);
        line.setAttribute('stroke', chart.style.grid_color);
        svg.appendChild(line);
      }

      chart.data.values.forEach((value, i) => {
        const barHeight = ((height - pad * 2) * value) / max;
        const x = pad + slot * i + slot * 0.2;
        const rect = document.createElementNS(ns, 'rect');
        rect.setAttribute('x', x);
        rect.setAttribute('y', height - pad - barHeight);
        rect.setAttribute('width', slot * 0.6);
        rect.setAttribute('height', barHeight);
        rect.setAttribute('fill', chart.style.bar_color);
        svg.appendChild(rect);

        const label = document.createElementNS(ns, 'text');
        label.setAttribute('x', x + slot * 0.3);
        label.setAttribute('y', height - pad + 18);
        label.setAttribute('text-anchor', 'middle');
        label.setAttribute('fill', chart.style.text_color);
        label.setAttribute('font-weight', 'bold');
        label.textContent = `${chart.data.labels[i]} (${value})`;
        svg.appendChild(label);
      });
      chartId = chart.id;
      chartRevision = chart.revision;
    };

    const fireRender = (token) => {
      requestAnimationFrame(async () => {
        try {
          const chart = await api('POST', '/api/chart/render', { token });
          if (chart) {
            drawChart(chart);
          }
        } catch (err) {
          if (err.status !== 409) {
            console.error(err);
          }
        }
      });
    };

    const renderStats = async () => {
      const picker = $('user-picker');
      picker.innerHTML = '';
      users.forEach((user) => {
        const button = document.createElement('button');
        button.className = user.id === view.selected_user ? 'active' : 'ghost';
        button.textContent = user.name;
        button.addEventListener('click', () =>
          api('POST', '/api/view/select', { user_id: user.id }).then(applyView)
        );
        picker.appendChild(button);
      });

      if (view.selected_user === null) {
        $('stats-summary').textContent = 'No workouts logged yet.';
        return;
      }
      const stats = await api('GET', `/api/users/${view.selected_user}/stats`);
      $('stats-summary').textContent =
        `${stats.name}: ${stats.total_minutes} minutes (${stats.workout_types})`;
      const ring = $('ring-fg');
      const circumference = 2 * Math.PI * 70;
      ring.style.strokeDasharray = circumference;
      ring.style.strokeDashoffset = circumference * (1 - stats.progress_percentage / 100);
      $('ring-label').textContent = `${stats.progress_percentage}%`;
    };

    const applyView = (snapshot) => {
      view = snapshot;
      $('home-view').classList.toggle('hidden', view.mode !== 'home');
      $('workouts-view').classList.toggle('hidden', view.mode !== 'workouts');
      $('stats-view').classList.toggle('hidden', view.mode !== 'stats');
      $('chart-panel').classList.toggle('hidden', view.stats_mode !== 'chart');
      $('circular-panel').classList.toggle('hidden', view.stats_mode !== 'circular');
      $('help-tooltip').classList.toggle('hidden', !view.tooltip_visible);

      if (!view.chart) {
        destroyChart();
      } else if (view.chart.id !== chartId || view.chart.revision !== chartRevision) {
        drawChart(view.chart);
      }
      if (view.pending_render !== null) {
        fireRender(view.pending_render);
      }
      if (view.mode === 'stats') {
        renderStats().catch((err) => console.error(err));
      }
    };

    const refreshView = () => api('GET', '/api/view').then(applyView);
    const refreshList = () => api('GET', '/api/list').then(renderList);

    const deleteUser = async (id) => {
      if (!confirm('Are you sure you want to delete this user?')) {
        return;
      }
      await api('DELETE', `/api/users/${id}?confirm=true`);
    };

    document.querySelectorAll('[data-view]').forEach((button) => {
      button.addEventListener('click', () =>
        api('POST', `/api/view/${button.dataset.view}`).then(applyView)
      );
    });

    $('stats-toggle').addEventListener('click', async () => {
      applyView(await api('POST', '/api/view/stats'));
      setTimeout(refreshView, 600);
    });

    $('stats-mode').addEventListener('click', () =>
      api('POST', '/api/view/stats-mode').then(applyView)
    );

    $('tooltip-close').addEventListener('click', () =>
      api('POST', '/api/view/tooltip/hide').then(applyView)
    );

    $('theme-toggle').addEventListener('click', async () => {
      applyTheme(await api('POST', '/api/theme/toggle'));
      refreshView();
    });

    $('workout-form').addEventListener('submit', async (event) => {
      event.preventDefault();
      const form = event.target;
      const errors = $('form-errors');
      errors.innerHTML = '';
      try {
        await api('POST', '/api/workouts', {
          name: form.elements.namedItem('name').value,
          type: form.elements.namedItem('type').value,
          minutes: Number(form.elements.namedItem('minutes').value) || 0
        });
        form.reset();
      } catch (err) {
        (err.errors.length ? err.errors : [err.message]).forEach((message) => {
          const li = document.createElement('li');
          li.textContent = message;
          errors.appendChild(li);
        });
      }
    });

    let searchTimer = null;
    $('search').addEventListener('input', (event) => {
      clearTimeout(searchTimer);
      searchTimer = setTimeout(() => {
        api('POST', '/api/list/search', { term: event.target.value }).then(renderList);
      }, 200);
    });

    $('filter-type').addEventListener('change', (event) => {
      api('POST', '/api/list/filter', { type: event.target.value }).then(renderList);
    });

    $('prev-page').addEventListener('click', () => api('POST', '/api/list/prev').then(renderList));
    $('next-page').addEventListener('click', () => api('POST', '/api/list/next').then(renderList));

    const events = new EventSource('/api/users/events');
    events.addEventListener('users', (event) => {
      users = JSON.parse(event.data);
      Promise.all([refreshList(), refreshView()]).catch((err) => console.error(err));
    });

    api('GET', '/api/theme').then(applyTheme);
  </script>
</body>
</html>
"#;
